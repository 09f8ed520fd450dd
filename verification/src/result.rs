//! Outcome of one verification attempt.

use serde::{Deserialize, Serialize};
use wardpass_types::{DenyReason, Identity, Timestamp};

/// The decision for a presented token.
///
/// A `Granted` carries a snapshot of the identity at decision time plus the
/// token's own expiry for display; a later sweep does not retroactively
/// change an already-returned snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum VerificationResult {
    Granted {
        identity: Identity,
        token_expires_at: Timestamp,
    },
    Denied {
        reason: DenyReason,
    },
}

impl VerificationResult {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// The deny reason, if this attempt was denied.
    pub fn deny_reason(&self) -> Option<DenyReason> {
        match self {
            Self::Denied { reason } => Some(*reason),
            Self::Granted { .. } => None,
        }
    }
}
