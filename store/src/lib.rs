//! Abstract storage traits for the wardpass credential system.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits.
//!
//! All access is through typed keys and structured values; no backend may
//! splice caller-supplied strings into a query.

pub mod error;
pub mod identity;
pub mod log;

pub use error::StoreError;
pub use identity::IdentityStore;
pub use log::VerificationLogStore;

/// Convenience bound for components that need both stores.
pub trait CredentialStore: IdentityStore + VerificationLogStore {}

impl<T: IdentityStore + VerificationLogStore> CredentialStore for T {}
