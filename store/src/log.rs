//! Verification log storage trait.

use crate::StoreError;
use wardpass_types::{IdentityId, NewLogEntry, VerificationLog};

/// Trait for the append-only audit log.
///
/// Rows are immutable once written. Inserts must be atomic and safe under
/// concurrent appenders; errors always propagate to the caller — a
/// verification attempt whose log row cannot be written has failed.
pub trait VerificationLogStore: Send + Sync {
    /// Allocate an id and insert one audit row.
    fn append_log(&self, entry: NewLogEntry) -> Result<VerificationLog, StoreError>;

    /// All rows referencing `id`, in insertion order.
    fn logs_for_identity(&self, id: IdentityId) -> Result<Vec<VerificationLog>, StoreError>;

    /// Total number of log rows.
    fn log_count(&self) -> Result<u64, StoreError>;
}
