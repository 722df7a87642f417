//! Fundamental types for voter manual verification.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! voter cases, masked Aadhaar fragments, officer identifiers, decisions,
//! the persisted verification record, and timestamps.

pub mod aadhaar;
pub mod decision;
pub mod error;
pub mod officer;
pub mod record;
pub mod time;
pub mod voter;

pub use aadhaar::AadhaarSuffix;
pub use decision::{Decision, VerificationMethod};
pub use error::TypesError;
pub use officer::OfficerId;
pub use record::{RecordDraft, VerificationRecord};
pub use time::Timestamp;
pub use voter::{VerificationStatus, VoterCase, VoterId};
