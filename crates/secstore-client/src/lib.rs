//! Secure object session protocol.
//!
//! [`ObjectStoreClient`] is the entry point for programs that keep small
//! objects (certificates, private keys) in a trusted storage service. Every
//! call opens its own session, invokes exactly one command, classifies the
//! result, and closes the session before returning:
//!
//! ```text
//! Idle -> SessionOpening -> CommandEncoded -> Invoked -> Completed -> SessionClosing -> Done
//! ```
//!
//! Results reduce to [`Outcome`] / [`ReadOutcome`] for expected answers and
//! [`ClientError`] for fatal ones. Nothing is retried, and the library
//! never exits the process; that decision belongs to the caller.

pub mod client;
pub mod config;
pub mod error;
pub mod outcome;

pub use client::ObjectStoreClient;
pub use config::{ClientConfig, ShortBufferPolicy};
pub use error::{ClientError, ClientResult};
pub use outcome::{Outcome, ReadOutcome};

// Re-export key types
pub use secstore_tee::{FileTee, InMemoryTee, TeeDriver};
pub use secstore_types::{ObjectKey, ObjectPayload, TaUuid, MAX_KEY_LEN, OBJECT_CAPACITY};
