//! Personnel identity records.

use crate::{IdentityId, Timestamp};
use serde::{Deserialize, Serialize};

/// A personnel record and the permanent subject of audit history.
///
/// `expires_at` is fixed at creation (issuance time plus the validity
/// window) and never changes afterwards. `is_active` starts `true` and only
/// ever transitions to `false` (expiry sweep or explicit revocation);
/// re-enabling access requires issuing a brand-new identity. Records are
/// never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: IdentityId,
    pub name: String,
    pub role: String,
    pub email: String,
    pub is_active: bool,
    pub expires_at: Timestamp,
}

impl Identity {
    /// Whether the credential window has closed relative to `now`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_past(now)
    }

    /// Whether this identity is stale: past its window but not yet swept.
    pub fn is_sweep_candidate(&self, now: Timestamp) -> bool {
        self.is_active && self.is_expired(now)
    }
}

/// The fields of an identity before the store has allocated its id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewIdentity {
    pub name: String,
    pub role: String,
    pub email: String,
    pub expires_at: Timestamp,
}
