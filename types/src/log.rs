//! Verification audit log rows.

use crate::{IdentityId, LogId, Timestamp};
use serde::{Deserialize, Serialize};

/// Outcome classification of a verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerifyStatus {
    Success,
    Failed,
}

impl VerifyStatus {
    /// Canonical string stored and reported for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

/// Geolocation reported by a checkpoint scanner, when available.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub long: f64,
}

/// One immutable audit row. Every verification attempt writes exactly one.
///
/// `user_id` is `None` when the token failed signature or expiry checks
/// before an identity could be resolved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationLog {
    pub id: LogId,
    pub user_id: Option<IdentityId>,
    pub status: VerifyStatus,
    pub failure_reason: Option<String>,
    pub geo: Option<GeoPoint>,
    pub created_at: Timestamp,
}

/// A log row before the store has allocated its id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewLogEntry {
    pub user_id: Option<IdentityId>,
    pub status: VerifyStatus,
    pub failure_reason: Option<String>,
    pub geo: Option<GeoPoint>,
    pub created_at: Timestamp,
}

impl NewLogEntry {
    /// A SUCCESS row for a resolved identity.
    pub fn success(user_id: IdentityId, geo: Option<GeoPoint>, now: Timestamp) -> Self {
        Self {
            user_id: Some(user_id),
            status: VerifyStatus::Success,
            failure_reason: None,
            geo,
            created_at: now,
        }
    }

    /// A FAILED row, with the identity attached when it could be resolved.
    pub fn failure(
        user_id: Option<IdentityId>,
        reason: impl Into<String>,
        geo: Option<GeoPoint>,
        now: Timestamp,
    ) -> Self {
        Self {
            user_id,
            status: VerifyStatus::Failed,
            failure_reason: Some(reason.into()),
            geo,
            created_at: now,
        }
    }
}
