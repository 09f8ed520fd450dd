//! Identity storage trait.

use crate::StoreError;
use wardpass_types::{Identity, IdentityId, NewIdentity, Timestamp};

/// Trait for identity persistence.
///
/// Implementations must make `create_identity` and `set_active` atomic at
/// the single-record level: a failed create leaves no partial record, and a
/// concurrent reader never observes a half-written one. No multi-record
/// transactions are required.
pub trait IdentityStore: Send + Sync {
    /// Allocate an id and persist a new identity with `is_active = true`.
    fn create_identity(&self, new: NewIdentity) -> Result<Identity, StoreError>;

    /// Fetch an identity by id. `StoreError::NotFound` if absent.
    fn get_identity(&self, id: IdentityId) -> Result<Identity, StoreError>;

    /// Idempotently set the active flag of an existing identity.
    fn set_active(&self, id: IdentityId, active: bool) -> Result<(), StoreError>;

    /// All identities with `expires_at < now && is_active == true`, in id
    /// order. These are the expiry sweep candidates.
    fn list_expired_active(&self, now: Timestamp) -> Result<Vec<Identity>, StoreError>;

    /// Total number of identity records.
    fn identity_count(&self) -> Result<u64, StoreError>;
}
