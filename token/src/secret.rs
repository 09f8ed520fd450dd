//! The process-wide signing secret.

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("signing secret environment variable {0} is not set")]
    Missing(String),

    #[error("signing secret must not be empty")]
    Empty,
}

/// The shared HMAC key for token signing and verification.
///
/// Loaded once at startup, immutable for the process lifetime, and wiped
/// from memory on drop. There is deliberately no `Default`: a missing
/// secret must fail startup rather than fall back to a literal.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Build a secret from raw bytes. Rejects empty input.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self(bytes))
    }

    /// Load the secret from an environment variable. Unset, whitespace-only,
    /// and empty values are all startup errors.
    pub fn from_env(var: &str) -> Result<Self, SecretError> {
        let value = std::env::var(var).map_err(|_| SecretError::Missing(var.to_string()))?;
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SecretError::Empty);
        }
        Self::new(trimmed.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        write!(f, "SigningSecret({} bytes)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_secret() {
        assert!(matches!(SigningSecret::new(vec![]), Err(SecretError::Empty)));
    }

    #[test]
    fn from_env_missing_var() {
        let err = SigningSecret::from_env("WARDPASS_TEST_UNSET_SECRET_VAR").unwrap_err();
        assert!(matches!(err, SecretError::Missing(_)));
    }

    #[test]
    fn debug_does_not_leak_bytes() {
        let secret = SigningSecret::new(b"super-secret".to_vec()).unwrap();
        let debug = format!("{secret:?}");
        assert!(!debug.contains("super-secret"));
    }
}
