//! Manual verification decision and method.

use crate::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The officers' verdict on a voter case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Past-tense label shown in the completion summary.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Approve => "Approved",
            Self::Reject => "Rejected",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(TypesError::UnknownDecision(other.to_string())),
        }
    }
}

/// How the officers established the voter's identity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    /// Physical identity documents inspected at the booth.
    #[default]
    IdDocuments,
    /// Biometric mismatch overridden by the officers.
    BiometricOverride,
    /// Any other means, described in the notes.
    Alternative,
}

impl VerificationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdDocuments => "id_documents",
            Self::BiometricOverride => "biometric_override",
            Self::Alternative => "alternative",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::IdDocuments => "ID Documents",
            Self::BiometricOverride => "Biometric Override",
            Self::Alternative => "Alternative Verification",
        }
    }
}

impl fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationMethod {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id_documents" => Ok(Self::IdDocuments),
            "biometric_override" => Ok(Self::BiometricOverride),
            "alternative" => Ok(Self::Alternative),
            other => Err(TypesError::UnknownMethod(other.to_string())),
        }
    }
}
