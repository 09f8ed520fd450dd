//! Classified reasons for denying a verification attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a verification attempt was denied.
///
/// These are the only client-facing rejection classes; anything else (store
/// unreachable, etc.) surfaces as a generic server error instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenyReason {
    /// Token was malformed or its MAC did not match the signing secret.
    InvalidSignature,
    /// Token carried a valid MAC but its embedded expiry has passed.
    PassExpired,
    /// Token was valid but the identity is missing or deactivated.
    IdRevokedInactive,
}

impl DenyReason {
    /// Canonical wire string, used both in responses and as the stored
    /// `failure_reason` of the audit row.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::PassExpired => "PASS_EXPIRED",
            Self::IdRevokedInactive => "ID_REVOKED_INACTIVE",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
