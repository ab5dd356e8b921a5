use thiserror::Error;

/// Errors produced while constructing secstore values.
///
/// All of these are caller-side precondition failures: a value that fails
/// validation is never handed to the secure backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("object key must not be empty")]
    EmptyKey,

    #[error("object key is {len} bytes, must be a maximum of {max}")]
    KeyTooLong { len: usize, max: usize },

    #[error("object key must not contain a NUL byte")]
    KeyContainsNul,

    #[error("payload is {len} bytes, object capacity is {max}")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("invalid trusted service uuid: {0}")]
    InvalidUuid(String),
}
