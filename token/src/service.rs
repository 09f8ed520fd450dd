//! Token signing and the verification decision for the token itself.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use thiserror::Error;

use wardpass_types::{IdentityId, Timestamp};

use crate::SigningSecret;

type HmacSha256 = Hmac<Sha256>;

/// What went wrong with a presented token.
///
/// Callers branch on these variants; the precedence is fixed so that a
/// tampered-but-unexpired token is always `InvalidSignature`, never
/// `Expired`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is structurally malformed")]
    Malformed,

    #[error("token signature does not match")]
    InvalidSignature,

    #[error("token expired at {0}")]
    Expired(Timestamp),
}

/// The signed payload embedded in every token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub identity_id: IdentityId,
    pub role: String,
    pub expires_at: Timestamp,
}

/// An opaque signed credential: `hex(claims) "." hex(mac)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token(String);

impl Token {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signs and verifies credential tokens with the process-wide secret.
///
/// Pure and stateless per call; safe to share across threads since its only
/// state is the immutable secret.
pub struct TokenService {
    secret: SigningSecret,
}

impl TokenService {
    pub fn new(secret: SigningSecret) -> Self {
        Self { secret }
    }

    /// Sign a token for `identity_id` that expires at `now + ttl_secs`.
    pub fn sign(
        &self,
        identity_id: IdentityId,
        role: impl Into<String>,
        ttl_secs: u64,
        now: Timestamp,
    ) -> Token {
        let claims = Claims {
            identity_id,
            role: role.into(),
            expires_at: now.add_secs(ttl_secs),
        };
        let claims_bytes =
            bincode::serialize(&claims).expect("claims are always bincode-serializable");
        let mac = self.compute_mac(&claims_bytes);
        Token(format!("{}.{}", hex::encode(claims_bytes), hex::encode(mac)))
    }

    /// Verify a presented token against the secret and the clock.
    ///
    /// Check order is fixed: envelope structure first (no cryptographic work
    /// on garbage), then the MAC in constant time, and only after MAC
    /// success the expiry comparison.
    pub fn verify(&self, token: &Token, now: Timestamp) -> Result<Claims, TokenError> {
        let (claims_hex, mac_hex) = token
            .as_str()
            .split_once('.')
            .ok_or(TokenError::Malformed)?;
        if claims_hex.is_empty() || mac_hex.contains('.') {
            return Err(TokenError::Malformed);
        }
        let claims_bytes = hex::decode(claims_hex).map_err(|_| TokenError::Malformed)?;
        let mac_bytes = hex::decode(mac_hex).map_err(|_| TokenError::Malformed)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(&claims_bytes);
        mac.verify_slice(&mac_bytes)
            .map_err(|_| TokenError::InvalidSignature)?;

        // A valid MAC over undecodable claims means the issuer itself wrote
        // garbage; still reported as malformed.
        let claims: Claims =
            bincode::deserialize(&claims_bytes).map_err(|_| TokenError::Malformed)?;

        if claims.expires_at.is_past(now) {
            return Err(TokenError::Expired(claims.expires_at));
        }
        Ok(claims)
    }

    fn compute_mac(&self, claims_bytes: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(claims_bytes);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn service() -> TokenService {
        TokenService::new(SigningSecret::new(b"test-signing-secret".to_vec()).unwrap())
    }

    fn other_service() -> TokenService {
        TokenService::new(SigningSecret::new(b"a-different-secret".to_vec()).unwrap())
    }

    #[test]
    fn sign_then_verify_returns_claims() {
        let svc = service();
        let now = Timestamp::new(1_000);
        let token = svc.sign(IdentityId::new(7), "Medic", 3_600, now);

        let claims = svc.verify(&token, now).unwrap();
        assert_eq!(claims.identity_id, IdentityId::new(7));
        assert_eq!(claims.role, "Medic");
        assert_eq!(claims.expires_at, Timestamp::new(4_600));
    }

    #[test]
    fn valid_at_exact_expiry_instant() {
        let svc = service();
        let token = svc.sign(IdentityId::new(1), "Scout", 100, Timestamp::new(0));
        assert!(svc.verify(&token, Timestamp::new(100)).is_ok());
        assert_eq!(
            svc.verify(&token, Timestamp::new(101)),
            Err(TokenError::Expired(Timestamp::new(100)))
        );
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token = service().sign(IdentityId::new(1), "Medic", 3_600, Timestamp::new(0));
        assert_eq!(
            other_service().verify(&token, Timestamp::new(0)),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_claims_are_invalid_signature() {
        let svc = service();
        let token = svc.sign(IdentityId::new(1), "Medic", 3_600, Timestamp::new(0));
        let (claims_hex, mac_hex) = token.as_str().split_once('.').unwrap();
        let mut tampered: Vec<u8> = hex::decode(claims_hex).unwrap();
        tampered[0] ^= 0xFF;
        let forged = Token::from_raw(format!("{}.{}", hex::encode(tampered), mac_hex));

        assert_eq!(
            svc.verify(&forged, Timestamp::new(0)),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn tampered_mac_is_invalid_signature() {
        let svc = service();
        let token = svc.sign(IdentityId::new(1), "Medic", 3_600, Timestamp::new(0));
        let (claims_hex, mac_hex) = token.as_str().split_once('.').unwrap();
        let mut mac: Vec<u8> = hex::decode(mac_hex).unwrap();
        mac[0] ^= 0x01;
        let forged = Token::from_raw(format!("{}.{}", claims_hex, hex::encode(mac)));

        assert_eq!(
            svc.verify(&forged, Timestamp::new(0)),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn signature_check_precedes_expiry_check() {
        // Expired AND tampered must report InvalidSignature, never Expired.
        let svc = service();
        let token = svc.sign(IdentityId::new(1), "Medic", 10, Timestamp::new(0));
        let (claims_hex, mac_hex) = token.as_str().split_once('.').unwrap();
        let mut tampered: Vec<u8> = hex::decode(claims_hex).unwrap();
        let last = tampered.len() - 1;
        tampered[last] ^= 0x80;
        let forged = Token::from_raw(format!("{}.{}", hex::encode(tampered), mac_hex));

        assert_eq!(
            svc.verify(&forged, Timestamp::new(1_000_000)),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn malformed_inputs() {
        let svc = service();
        let now = Timestamp::new(0);
        for raw in ["", "nodot", "zz.zz", "deadbeef", ".deadbeef", "a.b.c"] {
            assert_eq!(
                svc.verify(&Token::from_raw(raw), now),
                Err(TokenError::Malformed),
                "input {raw:?} should be malformed"
            );
        }
    }

    #[test]
    fn tokens_are_not_consumed() {
        let svc = service();
        let now = Timestamp::new(50);
        let token = svc.sign(IdentityId::new(3), "Ops", 500, now);
        assert!(svc.verify(&token, now).is_ok());
        assert!(svc.verify(&token, now).is_ok());
    }

    proptest! {
        #[test]
        fn roundtrip_for_arbitrary_roles(
            id in any::<u64>(),
            role in "\\PC{0,40}",
            ttl in 0u64..10_000_000,
            now in 0u64..1u64 << 40,
        ) {
            let svc = service();
            let now = Timestamp::new(now);
            let token = svc.sign(IdentityId::new(id), role.clone(), ttl, now);
            let claims = svc.verify(&token, now).unwrap();
            prop_assert_eq!(claims.identity_id, IdentityId::new(id));
            prop_assert_eq!(claims.role, role);
        }

        #[test]
        fn any_single_byte_flip_is_rejected(flip_at in 0usize..64) {
            let svc = service();
            let now = Timestamp::new(0);
            let token = svc.sign(IdentityId::new(9), "Medic", 1_000, now);
            let (claims_hex, mac_hex) = token.as_str().split_once('.').unwrap();
            let mut claims: Vec<u8> = hex::decode(claims_hex).unwrap();
            let pos = flip_at % claims.len();
            claims[pos] ^= 0x55;
            let forged = Token::from_raw(format!("{}.{}", hex::encode(claims), mac_hex));
            prop_assert_eq!(
                svc.verify(&forged, now),
                Err(TokenError::InvalidSignature)
            );
        }
    }
}
