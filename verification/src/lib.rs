//! Credential lifecycle engine.
//!
//! - [`Issuer`] creates an identity and signs its matching token in one
//!   issuance event
//! - [`VerificationEngine`] runs the fixed verification decision procedure:
//!   token check first, identity lookup second, and exactly one audit row
//!   appended on every path

pub mod engine;
pub mod issuer;
pub mod result;

pub use engine::VerificationEngine;
pub use issuer::{Issued, Issuer};
pub use result::VerificationResult;
