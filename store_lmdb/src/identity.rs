//! LMDB implementation of `IdentityStore`.

use wardpass_store::{IdentityStore, StoreError};
use wardpass_types::{Identity, IdentityId, NewIdentity, Timestamp};

use crate::environment::META_NEXT_IDENTITY_ID;
use crate::{LmdbCredentialStore, LmdbError};

impl LmdbCredentialStore {
    fn create_identity_inner(&self, new: NewIdentity) -> Result<Identity, LmdbError> {
        // Counter bump and insert share a write txn, so a failure commits
        // neither: no partial record and no burned id.
        let mut wtxn = self.env.write_txn()?;
        let id = IdentityId::new(self.alloc_id(&mut wtxn, META_NEXT_IDENTITY_ID)?);
        let identity = Identity {
            id,
            name: new.name,
            role: new.role,
            email: new.email,
            is_active: true,
            expires_at: new.expires_at,
        };
        let bytes = bincode::serialize(&identity)?;
        self.identities
            .put(&mut wtxn, &id.as_u64().to_be_bytes(), &bytes)?;
        wtxn.commit()?;
        Ok(identity)
    }

    fn get_identity_inner(&self, id: IdentityId) -> Result<Identity, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let raw = self
            .identities
            .get(&rtxn, &id.as_u64().to_be_bytes())?
            .ok_or_else(|| LmdbError::NotFound(id.to_string()))?;
        Ok(bincode::deserialize(raw)?)
    }

    fn set_active_inner(&self, id: IdentityId, active: bool) -> Result<(), LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let key = id.as_u64().to_be_bytes();
        let raw = self
            .identities
            .get(&wtxn, &key)?
            .ok_or_else(|| LmdbError::NotFound(id.to_string()))?;
        let mut identity: Identity = bincode::deserialize(raw)?;
        if identity.is_active == active {
            return Ok(()); // Idempotent; nothing to write.
        }
        identity.is_active = active;
        let bytes = bincode::serialize(&identity)?;
        self.identities.put(&mut wtxn, &key, &bytes)?;
        wtxn.commit()?;
        Ok(())
    }

    fn list_expired_active_inner(&self, now: Timestamp) -> Result<Vec<Identity>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let mut results = Vec::new();
        for entry in self.identities.iter(&rtxn)? {
            let (_key, raw) = entry?;
            let identity: Identity = bincode::deserialize(raw)?;
            if identity.is_sweep_candidate(now) {
                results.push(identity);
            }
        }
        Ok(results)
    }
}

impl IdentityStore for LmdbCredentialStore {
    fn create_identity(&self, new: NewIdentity) -> Result<Identity, StoreError> {
        Ok(self.create_identity_inner(new)?)
    }

    fn get_identity(&self, id: IdentityId) -> Result<Identity, StoreError> {
        Ok(self.get_identity_inner(id)?)
    }

    fn set_active(&self, id: IdentityId, active: bool) -> Result<(), StoreError> {
        Ok(self.set_active_inner(id, active)?)
    }

    fn list_expired_active(&self, now: Timestamp) -> Result<Vec<Identity>, StoreError> {
        Ok(self.list_expired_active_inner(now)?)
    }

    fn identity_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.identities.len(&rtxn).map_err(LmdbError::from)?)
    }
}
