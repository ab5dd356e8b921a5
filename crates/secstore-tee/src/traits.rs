use secstore_types::{LoginMethod, TaUuid};

use crate::error::TeeResult;
use crate::operation::Operation;

/// Entry point to a secure backend.
///
/// Implementations must satisfy these invariants:
/// - Every context returned by `initialize_context` is finalized by the
///   caller exactly once.
/// - Contexts are independent: nothing a context does is observable through
///   another context's sessions except the trusted service's own state.
pub trait TeeDriver: Send + Sync {
    type Context: TeeContext;

    /// Establish a connection context to the backend.
    fn initialize_context(&self) -> TeeResult<Self::Context>;
}

/// Connection to the secure backend.
pub trait TeeContext {
    type Session: TeeSession;

    /// Open a session against the trusted service identified by `uuid`.
    ///
    /// Returns `Err` if the service cannot be found or refuses the login.
    fn open_session(&mut self, uuid: &TaUuid, login: LoginMethod) -> TeeResult<Self::Session>;

    /// Release a session opened by this context.
    fn close_session(&mut self, session: Self::Session);

    /// Release the context. All of its sessions must already be closed.
    fn finalize(self);
}

/// Session bound to one trusted service instance.
pub trait TeeSession {
    /// Invoke `command` with the given parameters.
    ///
    /// Blocks until the backend answers. Output slots are updated in place,
    /// including on a short-buffer status.
    fn invoke_command(&mut self, command: u32, op: &mut Operation<'_>) -> TeeResult<()>;
}
