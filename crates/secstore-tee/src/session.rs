use secstore_types::{Command, LoginMethod, ResultCode, TaUuid};
use tracing::{debug, trace};

use crate::error::{SessionError, SessionStage, TeeError, TeeResult};
use crate::operation::Operation;
use crate::traits::{TeeContext, TeeDriver, TeeSession};

/// Opens sessions against one trusted service.
///
/// The service identity is fixed when the manager is built; the login mode
/// defaults to [`LoginMethod::Public`].
#[derive(Debug, Clone)]
pub struct SessionManager<D> {
    driver: D,
    uuid: TaUuid,
    login: LoginMethod,
}

impl<D: TeeDriver> SessionManager<D> {
    pub fn new(driver: D, uuid: TaUuid) -> Self {
        Self {
            driver,
            uuid,
            login: LoginMethod::Public,
        }
    }

    pub fn with_login(mut self, login: LoginMethod) -> Self {
        self.login = login;
        self
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn uuid(&self) -> &TaUuid {
        &self.uuid
    }

    /// Initialize a context, then open a session on it.
    ///
    /// Neither stage is retried. If opening the session fails, the context
    /// is finalized before the error is returned.
    pub fn open(&self) -> Result<Session<D::Context>, SessionError> {
        let mut context = self
            .driver
            .initialize_context()
            .map_err(|source| SessionError {
                stage: SessionStage::Context,
                source,
            })?;

        match context.open_session(&self.uuid, self.login) {
            Ok(session) => {
                debug!(uuid = %self.uuid, login = ?self.login, "session opened");
                Ok(Session {
                    context: Some(context),
                    session: Some(session),
                })
            }
            Err(source) => {
                context.finalize();
                Err(SessionError {
                    stage: SessionStage::OpenSession,
                    source,
                })
            }
        }
    }
}

/// Open session plus the context it lives on.
///
/// Dropping the guard closes the session and then finalizes the context.
/// [`Session::close`] does the same explicitly. Either way it happens once.
pub struct Session<C: TeeContext> {
    context: Option<C>,
    session: Option<C::Session>,
}

impl<C: TeeContext> Session<C> {
    /// Invoke a trusted service command over this session.
    pub fn invoke(&mut self, command: Command, op: &mut Operation<'_>) -> TeeResult<()> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| TeeError::api(ResultCode::BAD_STATE))?;
        trace!(command = %command, params = ?op.param_types(), "invoking command");
        session.invoke_command(command.id(), op)
    }

    /// Close the session, then finalize the context.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(session) = self.session.take() {
            if let Some(context) = self.context.as_mut() {
                context.close_session(session);
            }
        }
        if let Some(context) = self.context.take() {
            context.finalize();
            debug!("session closed");
        }
    }
}

impl<C: TeeContext> Drop for Session<C> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<C: TeeContext> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("open", &self.session.is_some())
            .finish()
    }
}
