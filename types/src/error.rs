//! Top-level error type for value construction and parsing.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid Aadhaar number: {0}")]
    InvalidAadhaar(String),

    #[error("officer identifier must not be empty")]
    EmptyOfficerId,

    #[error("voter identifier must not be empty")]
    EmptyVoterId,

    #[error("unknown decision '{0}', expected approve or reject")]
    UnknownDecision(String),

    #[error("unknown verification method '{0}', expected id_documents, biometric_override or alternative")]
    UnknownMethod(String),
}
