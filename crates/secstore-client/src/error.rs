use secstore_tee::SessionError;
use secstore_types::{Command, ErrorOrigin, ObjectKey, ResultCode, TypeError};
use thiserror::Error;

/// Fatal outcome of an object operation.
///
/// Expected answers (`NotFound`, a reported truncation) are not errors; see
/// [`crate::Outcome`] and [`crate::ReadOutcome`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid key or payload, detected before any backend interaction.
    #[error("precondition failed")]
    Precondition(#[from] TypeError),

    /// The backend or the trusted service could not be reached.
    #[error("cannot open a session with the trusted service")]
    Session(#[from] SessionError),

    /// The trusted service answered with an unexpected status.
    #[error("command {command} on '{key}' failed with {code} (origin {origin})")]
    Backend {
        command: Command,
        key: ObjectKey,
        code: ResultCode,
        origin: ErrorOrigin,
    },

    /// A stored object did not fit the read buffer.
    #[error("object '{key}' needs {required} bytes, read buffer holds {capacity}")]
    Truncated {
        key: ObjectKey,
        required: usize,
        capacity: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// `true` if the failure happened before the backend was contacted.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_))
    }

    /// Backend status behind the failure, if any.
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            Self::Session(e) => Some(e.source.code),
            Self::Backend { code, .. } => Some(*code),
            Self::Truncated { .. } => Some(ResultCode::SHORT_BUFFER),
            _ => None,
        }
    }
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
