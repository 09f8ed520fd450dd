//! Fundamental types for the wardpass credential system.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, timestamps, identity records, verification log
//! rows, deny reasons, and tunable parameters.

pub mod id;
pub mod identity;
pub mod log;
pub mod params;
pub mod reason;
pub mod time;

pub use id::{IdentityId, LogId};
pub use identity::{Identity, NewIdentity};
pub use log::{GeoPoint, NewLogEntry, VerificationLog, VerifyStatus};
pub use params::PassParams;
pub use reason::DenyReason;
pub use time::Timestamp;
