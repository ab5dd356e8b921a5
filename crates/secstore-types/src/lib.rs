//! Foundation types for secstore.
//!
//! secstore talks to a trusted service running inside a secure backend
//! (a TEE) and stores small objects there. This crate holds the types every
//! other secstore crate shares.
//!
//! # Key Types
//!
//! - [`ObjectKey`]: validated textual key (1..=64 bytes, no NUL)
//! - [`ObjectPayload`]: payload bounded by [`OBJECT_CAPACITY`]
//! - [`TaUuid`]: identity of the trusted service a session binds to
//! - [`Command`]: command identifiers understood by the trusted service
//! - [`ResultCode`] / [`ErrorOrigin`]: raw backend status and the layer that produced it
//! - [`LoginMethod`]: how a session authenticates the host

pub mod codes;
pub mod error;
pub mod identity;
pub mod key;
pub mod payload;

pub use codes::{ErrorOrigin, LoginMethod, ResultCode};
pub use error::TypeError;
pub use identity::{Command, TaUuid};
pub use key::{ObjectKey, HASHED_NAMESPACE_LEN, MAX_KEY_LEN};
pub use payload::{ObjectPayload, OBJECT_CAPACITY};
