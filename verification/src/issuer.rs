//! Issuance: one identity record plus one signed token per event.

use std::sync::Arc;

use wardpass_store::{IdentityStore, StoreError};
use wardpass_token::{Token, TokenService};
use wardpass_types::{Identity, NewIdentity, Timestamp};

/// Result of one issuance event. The holder owns the token; the server
/// keeps no session state for it.
#[derive(Clone, Debug)]
pub struct Issued {
    pub identity: Identity,
    pub token: Token,
}

/// Creates identities and their signed tokens.
///
/// The identity record and the token share one expiry instant
/// (`now + validity_window`), fixed at creation.
pub struct Issuer<S> {
    tokens: Arc<TokenService>,
    store: Arc<S>,
    validity_window_secs: u64,
}

impl<S: IdentityStore> Issuer<S> {
    pub fn new(tokens: Arc<TokenService>, store: Arc<S>, validity_window_secs: u64) -> Self {
        Self {
            tokens,
            store,
            validity_window_secs,
        }
    }

    /// Create an identity and sign its token.
    ///
    /// A store failure propagates with no partial record committed (the
    /// store's single-record atomicity guarantee) and no token is signed.
    pub fn issue(
        &self,
        name: impl Into<String>,
        role: impl Into<String>,
        email: impl Into<String>,
        now: Timestamp,
    ) -> Result<Issued, StoreError> {
        let identity = self.store.create_identity(NewIdentity {
            name: name.into(),
            role: role.into(),
            email: email.into(),
            expires_at: now.add_secs(self.validity_window_secs),
        })?;
        let token = self.tokens.sign(
            identity.id,
            identity.role.clone(),
            self.validity_window_secs,
            now,
        );
        tracing::info!(id = %identity.id, expires_at = %identity.expires_at, "issued credential");
        Ok(Issued { identity, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardpass_nullables::NullStore;
    use wardpass_token::SigningSecret;
    use wardpass_types::PassParams;

    fn issuer(store: Arc<NullStore>) -> Issuer<NullStore> {
        let tokens = Arc::new(TokenService::new(
            SigningSecret::new(b"issuer-test-secret".to_vec()).unwrap(),
        ));
        Issuer::new(tokens, store, PassParams::default().validity_window_secs)
    }

    #[test]
    fn issue_pins_expiry_to_now_plus_window() {
        let store = Arc::new(NullStore::new());
        let issued = issuer(store)
            .issue("Alice", "Medic", "a@x.com", Timestamp::new(1_000))
            .unwrap();
        assert_eq!(issued.identity.expires_at, Timestamp::new(1_000 + 172_800));
        assert!(issued.identity.is_active);
    }

    #[test]
    fn issued_token_verifies_with_matching_claims() {
        let store = Arc::new(NullStore::new());
        let tokens = Arc::new(TokenService::new(
            SigningSecret::new(b"issuer-test-secret".to_vec()).unwrap(),
        ));
        let issuer = Issuer::new(tokens.clone(), store, 172_800);
        let now = Timestamp::new(50);
        let issued = issuer.issue("Alice", "Medic", "a@x.com", now).unwrap();

        let claims = tokens.verify(&issued.token, now).unwrap();
        assert_eq!(claims.identity_id, issued.identity.id);
        assert_eq!(claims.role, "Medic");
        assert_eq!(claims.expires_at, issued.identity.expires_at);
    }
}
