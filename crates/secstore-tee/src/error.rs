use std::fmt;

use secstore_types::{ErrorOrigin, ResultCode};

/// Non-success status reported by the secure backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("backend returned {code} (origin {origin})")]
pub struct TeeError {
    pub code: ResultCode,
    pub origin: ErrorOrigin,
}

impl TeeError {
    pub fn new(code: ResultCode, origin: ErrorOrigin) -> Self {
        Self { code, origin }
    }

    /// Error raised by the host-side client layer.
    pub fn api(code: ResultCode) -> Self {
        Self::new(code, ErrorOrigin::Api)
    }

    /// Error raised by the backend core.
    pub fn tee(code: ResultCode) -> Self {
        Self::new(code, ErrorOrigin::Tee)
    }

    /// Error raised by the trusted service.
    pub fn trusted_app(code: ResultCode) -> Self {
        Self::new(code, ErrorOrigin::TrustedApp)
    }
}

/// Result alias for backend calls.
pub type TeeResult<T> = Result<T, TeeError>;

/// Stage of session establishment that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    /// Initializing the connection context.
    Context,
    /// Opening the session against the trusted service.
    OpenSession,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context => f.write_str("context initialization"),
            Self::OpenSession => f.write_str("session open"),
        }
    }
}

/// Failure to establish a session. Never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{stage} failed")]
pub struct SessionError {
    pub stage: SessionStage,
    #[source]
    pub source: TeeError,
}
