//! The verification decision procedure.

use std::sync::Arc;

use wardpass_store::{CredentialStore, StoreError};
use wardpass_token::{Token, TokenError, TokenService};
use wardpass_types::{DenyReason, GeoPoint, NewLogEntry, Timestamp};

use crate::result::VerificationResult;

/// Orchestrates one verification attempt.
///
/// The order is fixed: token check first (no store traffic for tampered or
/// expired input), identity lookup second, and exactly one audit row on
/// every decision path. Requests are independent and may run fully in
/// parallel; the engine holds no mutable state.
pub struct VerificationEngine<S> {
    tokens: Arc<TokenService>,
    store: Arc<S>,
}

impl<S: CredentialStore> VerificationEngine<S> {
    pub fn new(tokens: Arc<TokenService>, store: Arc<S>) -> Self {
        Self { tokens, store }
    }

    /// Decide one verification attempt.
    ///
    /// Tokens are not consumed: the same valid token yields `Granted` again
    /// on the next call, with an independent audit row each time.
    ///
    /// A `StoreError` (identity lookup failing for backend reasons, or the
    /// audit row itself not persisting) propagates to the caller — it is a
    /// server failure, not a deny classification.
    pub fn verify(
        &self,
        token: &Token,
        geo: Option<GeoPoint>,
        now: Timestamp,
    ) -> Result<VerificationResult, StoreError> {
        let claims = match self.tokens.verify(token, now) {
            Ok(claims) => claims,
            Err(err) => {
                let reason = match err {
                    TokenError::Malformed | TokenError::InvalidSignature => {
                        DenyReason::InvalidSignature
                    }
                    TokenError::Expired(_) => DenyReason::PassExpired,
                };
                // No identity was resolved; the row carries no user_id.
                return self.deny(reason, None, geo, now);
            }
        };

        let identity = match self.store.get_identity(claims.identity_id) {
            Ok(identity) => identity,
            Err(err) if err.is_not_found() => {
                return self.deny(
                    DenyReason::IdRevokedInactive,
                    Some(claims.identity_id),
                    geo,
                    now,
                );
            }
            Err(err) => return Err(err),
        };

        if !identity.is_active {
            return self.deny(DenyReason::IdRevokedInactive, Some(identity.id), geo, now);
        }

        self.store
            .append_log(NewLogEntry::success(identity.id, geo, now))?;
        tracing::debug!(id = %identity.id, "verification granted");
        Ok(VerificationResult::Granted {
            identity,
            token_expires_at: claims.expires_at,
        })
    }

    fn deny(
        &self,
        reason: DenyReason,
        user_id: Option<wardpass_types::IdentityId>,
        geo: Option<GeoPoint>,
        now: Timestamp,
    ) -> Result<VerificationResult, StoreError> {
        self.store
            .append_log(NewLogEntry::failure(user_id, reason.as_str(), geo, now))?;
        tracing::debug!(%reason, "verification denied");
        Ok(VerificationResult::Denied { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardpass_nullables::NullStore;
    use wardpass_store::IdentityStore;
    use wardpass_token::SigningSecret;
    use wardpass_types::{IdentityId, NewIdentity, VerifyStatus};

    const WINDOW: u64 = 172_800;

    struct Fixture {
        tokens: Arc<TokenService>,
        store: Arc<NullStore>,
        engine: VerificationEngine<NullStore>,
    }

    fn fixture() -> Fixture {
        let tokens = Arc::new(TokenService::new(
            SigningSecret::new(b"engine-test-secret".to_vec()).unwrap(),
        ));
        let store = Arc::new(NullStore::new());
        let engine = VerificationEngine::new(tokens.clone(), store.clone());
        Fixture {
            tokens,
            store,
            engine,
        }
    }

    fn issue(f: &Fixture, name: &str, now: Timestamp) -> (IdentityId, Token) {
        let identity = f
            .store
            .create_identity(NewIdentity {
                name: name.to_string(),
                role: "Medic".to_string(),
                email: format!("{}@x.com", name.to_lowercase()),
                expires_at: now.add_secs(WINDOW),
            })
            .unwrap();
        let token = f.tokens.sign(identity.id, "Medic", WINDOW, now);
        (identity.id, token)
    }

    #[test]
    fn fresh_token_is_granted_with_matching_snapshot() {
        let f = fixture();
        let now = Timestamp::new(1_000);
        let (_, token) = issue(&f, "Alice", now);

        let result = f.engine.verify(&token, None, now).unwrap();
        match result {
            VerificationResult::Granted {
                identity,
                token_expires_at,
            } => {
                assert_eq!(identity.name, "Alice");
                assert_eq!(identity.role, "Medic");
                assert_eq!(identity.email, "alice@x.com");
                assert_eq!(token_expires_at, now.add_secs(WINDOW));
            }
            other => panic!("expected Granted, got {other:?}"),
        }
        let logs = f.store.all_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, VerifyStatus::Success);
    }

    #[test]
    fn tampered_token_denied_without_store_lookup() {
        let f = fixture();
        let now = Timestamp::new(0);
        let (_, token) = issue(&f, "Alice", now);
        // Flip the leading hex digit of the claims so the MAC cannot match.
        let mut raw = token.as_str().to_string();
        let flipped = if raw.starts_with('0') { "1" } else { "0" };
        raw.replace_range(0..1, flipped);
        let forged = Token::from_raw(raw);

        let result = f.engine.verify(&forged, None, now).unwrap();
        assert_eq!(result.deny_reason(), Some(DenyReason::InvalidSignature));

        let logs = f.store.all_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, VerifyStatus::Failed);
        assert_eq!(logs[0].user_id, None);
        assert_eq!(logs[0].failure_reason.as_deref(), Some("INVALID_SIGNATURE"));
        assert_eq!(f.store.identity_read_count(), 0);
    }

    #[test]
    fn expired_token_denied_without_store_lookup() {
        let f = fixture();
        let issued_at = Timestamp::new(0);
        let (_, token) = issue(&f, "Alice", issued_at);

        let later = issued_at.add_secs(WINDOW + 1);
        let result = f.engine.verify(&token, None, later).unwrap();
        assert_eq!(result.deny_reason(), Some(DenyReason::PassExpired));

        let logs = f.store.all_logs();
        assert_eq!(logs[0].user_id, None);
        assert_eq!(logs[0].failure_reason.as_deref(), Some("PASS_EXPIRED"));
        assert_eq!(f.store.identity_read_count(), 0);
    }

    #[test]
    fn inactive_identity_denied_with_user_id_recorded() {
        let f = fixture();
        let now = Timestamp::new(10);
        let (id, token) = issue(&f, "Alice", now);
        f.store.set_active(id, false).unwrap();

        let result = f.engine.verify(&token, None, now).unwrap();
        assert_eq!(result.deny_reason(), Some(DenyReason::IdRevokedInactive));

        let logs = f.store.all_logs();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].user_id, Some(id));
        assert_eq!(
            logs[0].failure_reason.as_deref(),
            Some("ID_REVOKED_INACTIVE")
        );
    }

    #[test]
    fn unknown_identity_denied_with_claimed_id_recorded() {
        let f = fixture();
        let now = Timestamp::new(10);
        // Validly signed token for an identity the store has never seen.
        let token = f.tokens.sign(IdentityId::new(42), "Medic", WINDOW, now);

        let result = f.engine.verify(&token, None, now).unwrap();
        assert_eq!(result.deny_reason(), Some(DenyReason::IdRevokedInactive));
        assert_eq!(f.store.all_logs()[0].user_id, Some(IdentityId::new(42)));
    }

    #[test]
    fn expiry_short_circuits_before_revocation_check() {
        // An expired token for a deactivated identity reports PASS_EXPIRED:
        // the token check runs first and the store is never consulted.
        let f = fixture();
        let issued_at = Timestamp::new(0);
        let (id, token) = issue(&f, "Alice", issued_at);
        f.store.set_active(id, false).unwrap();

        let later = issued_at.add_secs(WINDOW + 3_600);
        let result = f.engine.verify(&token, None, later).unwrap();
        assert_eq!(result.deny_reason(), Some(DenyReason::PassExpired));
        assert_eq!(f.store.identity_read_count(), 0);
    }

    #[test]
    fn verification_is_repeatable_with_independent_rows() {
        let f = fixture();
        let now = Timestamp::new(500);
        let (id, token) = issue(&f, "Alice", now);

        assert!(f.engine.verify(&token, None, now).unwrap().is_granted());
        assert!(f.engine.verify(&token, None, now).unwrap().is_granted());

        let logs = f.store.all_logs();
        assert_eq!(logs.len(), 2);
        assert_ne!(logs[0].id, logs[1].id);
        assert!(logs.iter().all(|l| l.user_id == Some(id)));
    }

    #[test]
    fn geo_is_recorded_on_success_and_failure() {
        let f = fixture();
        let now = Timestamp::new(0);
        let (_, token) = issue(&f, "Alice", now);
        let geo = GeoPoint {
            lat: 27.1751,
            long: 78.0421,
        };

        f.engine.verify(&token, Some(geo), now).unwrap();
        f.engine
            .verify(&Token::from_raw("garbage"), Some(geo), now)
            .unwrap();

        let logs = f.store.all_logs();
        assert!(logs.iter().all(|l| l.geo == Some(geo)));
    }

    #[test]
    fn log_append_failure_propagates() {
        let f = fixture();
        let now = Timestamp::new(0);
        let (_, token) = issue(&f, "Alice", now);
        f.store.fail_appends(true);

        let err = f.engine.verify(&token, None, now).unwrap_err();
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
