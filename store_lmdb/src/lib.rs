//! LMDB storage backend for the wardpass credential system.
//!
//! Implements the storage traits from `wardpass-store` using the `heed`
//! LMDB bindings. All logical stores live in one LMDB environment:
//!
//! - `identities`    — big-endian id key, bincode-serialized [`Identity`]
//! - `logs`          — big-endian id key, bincode-serialized row
//! - `identity_logs` — composite key `identity_id ++ log_id`, the per-identity
//!   audit index (a prefix range-scan lists one identity's rows)
//! - `meta`          — monotonic id counters

pub mod environment;
pub mod error;
pub mod identity;
pub mod log;

pub use environment::{check_data_dir, LmdbCredentialStore};
pub use error::LmdbError;
