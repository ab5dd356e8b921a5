//! Secure backend seam for secstore.
//!
//! The secure backend is reached in three steps, mirroring the TEE client
//! model: a driver initializes a *context*, the context opens a *session*
//! bound to a trusted service, and the session invokes *commands* carrying
//! up to four typed parameter slots.
//!
//! # Backend traits
//!
//! - [`TeeDriver`]: entry point that initializes contexts
//! - [`TeeContext`]: connection to the backend; opens and closes sessions
//! - [`TeeSession`]: bound trusted service; invokes commands
//!
//! [`SessionManager`] wraps a driver and hands out [`Session`] guards that
//! release the session and then the context exactly once, on every path.
//!
//! # Simulated drivers
//!
//! - [`InMemoryTee`]: `HashMap`-backed, with call counters and fault
//!   injection for tests
//! - [`FileTee`]: one file per object under a directory, for running the
//!   CLI on a development host
//!
//! Both emulate the secure storage service's command contract through
//! [`service::dispatch`]. Neither is a model of how the real backend stores
//! anything.

pub mod error;
pub mod file;
pub mod memory;
pub mod operation;
pub mod service;
pub mod session;
pub mod traits;

pub use error::{SessionError, SessionStage, TeeError, TeeResult};
pub use file::FileTee;
pub use memory::{InMemoryTee, TeeStats};
pub use operation::{Operation, Param, ParamType};
pub use session::{Session, SessionManager};
pub use traits::{TeeContext, TeeDriver, TeeSession};
