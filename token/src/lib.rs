//! Signed, time-bound credential tokens.
//!
//! - **HMAC-SHA256** over bincode-serialized claims, keyed by a process-wide
//!   signing secret
//! - Wire format: `hex(claims) "." hex(mac)` — independently verifiable by
//!   any process holding the secret, with no server-side session state
//! - Verification order is fixed: structure, then MAC (constant-time), then
//!   expiry — a tampered token is never reported as merely expired

pub mod secret;
pub mod service;

pub use secret::{SecretError, SigningSecret};
pub use service::{Claims, Token, TokenError, TokenService};
