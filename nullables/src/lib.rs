//! Nullable infrastructure for deterministic testing.
//!
//! All external collaborators of the verification workflow (clock, record
//! store, officer authentication, operator identity) are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record every call for later assertions
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod authenticator;
pub mod clock;
pub mod identity;
pub mod store;

pub use authenticator::NullAuthenticator;
pub use clock::NullClock;
pub use identity::NullIdentityProvider;
pub use store::{NullRecordStore, WriteAttempt};
