//! LMDB environment setup and shared helpers.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// Default map size: 1 GiB is far more than a credential store needs, and
/// LMDB only allocates pages as they are used.
const DEFAULT_MAP_SIZE: usize = 1 << 30;
const MAX_DBS: u32 = 4;

/// Meta keys for the monotonic id counters.
pub(crate) const META_NEXT_IDENTITY_ID: &[u8] = b"next_identity_id";
pub(crate) const META_NEXT_LOG_ID: &[u8] = b"next_log_id";

/// The LMDB credential store: one environment, all database handles.
///
/// Implements `IdentityStore` (see `identity.rs`) and
/// `VerificationLogStore` (see `log.rs`). Cloneable and thread-safe; all
/// clones share the same environment.
#[derive(Clone)]
pub struct LmdbCredentialStore {
    pub(crate) env: Arc<Env>,
    pub(crate) identities: Database<Bytes, Bytes>,
    pub(crate) logs: Database<Bytes, Bytes>,
    pub(crate) identity_logs: Database<Bytes, Bytes>,
    pub(crate) meta: Database<Bytes, Bytes>,
}

impl LmdbCredentialStore {
    /// Open or create the LMDB environment at `path` with the default map
    /// size.
    pub fn open(path: &Path) -> Result<Self, LmdbError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        check_data_dir(path).map_err(LmdbError::DataDir)?;
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::DataDir(format!("cannot create {}: {e}", path.display())))?;

        // Safety contract of heed: the same path must not be opened twice
        // within one process. The daemon opens a single store.
        let env = unsafe {
            EnvOpenOptions::new()
                .max_dbs(MAX_DBS)
                .map_size(map_size)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let identities: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some("identities"))?;
        let logs: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("logs"))?;
        let identity_logs: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some("identity_logs"))?;
        let meta: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some("meta"))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), "opened LMDB credential store");

        Ok(Self {
            env: Arc::new(env),
            identities,
            logs,
            identity_logs,
            meta,
        })
    }

    /// Allocate the next id from a meta counter, inside the caller's write
    /// transaction so the bump commits atomically with the insert using it.
    pub(crate) fn alloc_id(
        &self,
        wtxn: &mut heed::RwTxn<'_>,
        counter_key: &[u8],
    ) -> Result<u64, LmdbError> {
        let next = match self.meta.get(wtxn, counter_key)? {
            Some(raw) => {
                let bytes: [u8; 8] = raw
                    .try_into()
                    .map_err(|_| LmdbError::Serialization("bad meta counter width".into()))?;
                u64::from_be_bytes(bytes)
            }
            None => 1,
        };
        self.meta
            .put(wtxn, counter_key, &(next + 1).to_be_bytes())?;
        Ok(next)
    }
}

/// The exclusive upper bound for a prefix range-scan: the prefix treated as
/// a big-endian integer and incremented. `None` when the prefix is all
/// `0xFF`, in which case the scan is unbounded above.
pub(crate) fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut upper = prefix.to_vec();
    for byte in upper.iter_mut().rev() {
        if *byte < u8::MAX {
            *byte += 1;
            return Some(upper);
        }
        *byte = 0;
    }
    None
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent or empty) directory. Returns
/// an error if the directory has contents but `data.mdb` is missing, which
/// suggests corruption or a misconfigured path.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(()); // Fresh start
    }
    let mut entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => return Err(format!("cannot read {}: {e}", path.display())),
    };
    if entries.next().is_none() {
        return Ok(()); // Empty directory, also a fresh start
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "directory {} is non-empty but data.mdb is missing",
            path.display()
        ));
    }
    Ok(())
}
