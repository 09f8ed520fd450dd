//! LMDB implementation of `VerificationLogStore`.
//!
//! Rows live in `logs` under their big-endian id. The `identity_logs`
//! database is a secondary index with composite keys
//! `identity_id_be ++ log_id_be`, so one identity's audit trail is a prefix
//! range-scan in insertion order.

use std::ops::Bound;

use wardpass_store::{StoreError, VerificationLogStore};
use wardpass_types::{IdentityId, LogId, NewLogEntry, VerificationLog};

use crate::environment::{prefix_upper_bound, META_NEXT_LOG_ID};
use crate::{LmdbCredentialStore, LmdbError};

/// Build composite key `identity_id_be ++ log_id_be`.
fn composite_key(identity: IdentityId, log: LogId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&identity.as_u64().to_be_bytes());
    key[8..].copy_from_slice(&log.as_u64().to_be_bytes());
    key
}

impl LmdbCredentialStore {
    fn append_log_inner(&self, entry: NewLogEntry) -> Result<VerificationLog, LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let id = LogId::new(self.alloc_id(&mut wtxn, META_NEXT_LOG_ID)?);
        let row = VerificationLog {
            id,
            user_id: entry.user_id,
            status: entry.status,
            failure_reason: entry.failure_reason,
            geo: entry.geo,
            created_at: entry.created_at,
        };
        let bytes = bincode::serialize(&row)?;
        self.logs.put(&mut wtxn, &id.as_u64().to_be_bytes(), &bytes)?;
        if let Some(user_id) = row.user_id {
            self.identity_logs
                .put(&mut wtxn, &composite_key(user_id, id), &[])?;
        }
        wtxn.commit()?;
        Ok(row)
    }

    fn logs_for_identity_inner(&self, id: IdentityId) -> Result<Vec<VerificationLog>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let prefix = id.as_u64().to_be_bytes();
        let upper = prefix_upper_bound(&prefix);
        let bounds = (
            Bound::Included(&prefix[..]),
            match upper.as_deref() {
                Some(u) => Bound::Excluded(u),
                None => Bound::Unbounded,
            },
        );
        let mut rows = Vec::new();
        for entry in self.identity_logs.range(&rtxn, &bounds)? {
            let (key, _) = entry?;
            let log_key = &key[8..];
            let raw = self
                .logs
                .get(&rtxn, log_key)?
                .ok_or_else(|| LmdbError::NotFound(format!("dangling log index for {id}")))?;
            rows.push(bincode::deserialize(raw)?);
        }
        Ok(rows)
    }
}

impl VerificationLogStore for LmdbCredentialStore {
    fn append_log(&self, entry: NewLogEntry) -> Result<VerificationLog, StoreError> {
        Ok(self.append_log_inner(entry)?)
    }

    fn logs_for_identity(&self, id: IdentityId) -> Result<Vec<VerificationLog>, StoreError> {
        Ok(self.logs_for_identity_inner(id)?)
    }

    fn log_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.logs.len(&rtxn).map_err(LmdbError::from)?)
    }
}
