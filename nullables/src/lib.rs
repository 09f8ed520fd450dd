//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (storage, notification delivery) are abstracted
//! behind traits. This crate provides test-friendly implementations that
//! return deterministic values, can be controlled programmatically, and
//! never touch the filesystem or network.
//!
//! Usage: swap real implementations for nullables in tests.

pub mod notify;
pub mod store;

pub use notify::NullNotifier;
pub use store::NullStore;
