//! Nullable store — thread-safe in-memory storage for testing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use wardpass_store::{IdentityStore, StoreError, VerificationLogStore};
use wardpass_types::{
    Identity, IdentityId, LogId, NewIdentity, NewLogEntry, Timestamp, VerificationLog,
};

/// An in-memory identity + log store for testing.
///
/// Thread-safe for use with tokio's multi-threaded runtime. Beyond the
/// trait contract it exposes introspection hooks: a count of identity
/// reads (to assert that denied-before-lookup paths never touch the store)
/// and a switch that makes log appends fail (to test error propagation).
pub struct NullStore {
    identities: Mutex<BTreeMap<u64, Identity>>,
    logs: Mutex<Vec<VerificationLog>>,
    next_identity_id: AtomicU64,
    next_log_id: AtomicU64,
    identity_reads: AtomicU64,
    fail_appends: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            identities: Mutex::new(BTreeMap::new()),
            logs: Mutex::new(Vec::new()),
            next_identity_id: AtomicU64::new(1),
            next_log_id: AtomicU64::new(1),
            identity_reads: AtomicU64::new(0),
            fail_appends: AtomicBool::new(false),
        }
    }

    /// Snapshot of every log row in insertion order.
    pub fn all_logs(&self) -> Vec<VerificationLog> {
        self.logs.lock().unwrap().clone()
    }

    /// How many times `get_identity` has been called.
    pub fn identity_read_count(&self) -> u64 {
        self.identity_reads.load(Ordering::Relaxed)
    }

    /// Make every subsequent `append_log` fail with a backend error.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::Relaxed);
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityStore for NullStore {
    fn create_identity(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        let id = self.next_identity_id.fetch_add(1, Ordering::Relaxed);
        let identity = Identity {
            id: IdentityId::new(id),
            name: new.name,
            role: new.role,
            email: new.email,
            is_active: true,
            expires_at: new.expires_at,
        };
        self.identities
            .lock()
            .unwrap()
            .insert(id, identity.clone());
        Ok(identity)
    }

    fn get_identity(&self, id: IdentityId) -> Result<Identity, StoreError> {
        self.identity_reads.fetch_add(1, Ordering::Relaxed);
        self.identities
            .lock()
            .unwrap()
            .get(&id.as_u64())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn set_active(&self, id: IdentityId, active: bool) -> Result<(), StoreError> {
        let mut identities = self.identities.lock().unwrap();
        let identity = identities
            .get_mut(&id.as_u64())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        identity.is_active = active;
        Ok(())
    }

    fn list_expired_active(&self, now: Timestamp) -> Result<Vec<Identity>, StoreError> {
        Ok(self
            .identities
            .lock()
            .unwrap()
            .values()
            .filter(|i| i.is_sweep_candidate(now))
            .cloned()
            .collect())
    }

    fn identity_count(&self) -> Result<u64, StoreError> {
        Ok(self.identities.lock().unwrap().len() as u64)
    }
}

impl VerificationLogStore for NullStore {
    fn append_log(&self, entry: NewLogEntry) -> Result<VerificationLog, StoreError> {
        if self.fail_appends.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("append_log disabled by test".into()));
        }
        let row = VerificationLog {
            id: LogId::new(self.next_log_id.fetch_add(1, Ordering::Relaxed)),
            user_id: entry.user_id,
            status: entry.status,
            failure_reason: entry.failure_reason,
            geo: entry.geo,
            created_at: entry.created_at,
        };
        self.logs.lock().unwrap().push(row.clone());
        Ok(row)
    }

    fn logs_for_identity(&self, id: IdentityId) -> Result<Vec<VerificationLog>, StoreError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.user_id == Some(id))
            .cloned()
            .collect())
    }

    fn log_count(&self) -> Result<u64, StoreError> {
        Ok(self.logs.lock().unwrap().len() as u64)
    }
}
