use std::fmt;

use thiserror::Error;
use votecheck_identity::IdentityError;
use votecheck_store::StoreError;
use votecheck_types::OfficerId;

use crate::WorkflowState;

/// A text input of the attestation forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputField {
    OfficerOneId,
    OfficerOneCredential,
    OfficerTwoId,
    OfficerTwoCredential,
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OfficerOneId => "first officer id",
            Self::OfficerOneCredential => "first officer password",
            Self::OfficerTwoId => "second officer id",
            Self::OfficerTwoCredential => "second officer password",
        })
    }
}

/// Something `complete_verification` needs but does not have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingInput {
    OfficerOneAttestation,
    OfficerTwoAttestation,
    Decision,
    Notes,
}

impl fmt::Display for MissingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OfficerOneAttestation => "first officer verification",
            Self::OfficerTwoAttestation => "second officer verification",
            Self::Decision => "approve or reject decision",
            Self::Notes => "verification notes",
        })
    }
}

/// A workflow operation, for state errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    SubmitOfficerOne,
    SubmitOfficerTwo,
    SetDecision,
    SetMethod,
    SetNotes,
    CompleteVerification,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SubmitOfficerOne => "submit the first officer",
            Self::SubmitOfficerTwo => "submit the second officer",
            Self::SetDecision => "change the decision",
            Self::SetMethod => "change the verification method",
            Self::SetNotes => "change the notes",
            Self::CompleteVerification => "complete verification",
        })
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{field} must not be empty")]
    EmptyInput { field: InputField },

    #[error("second verification officer must be different from the first officer")]
    DuplicateOfficer,

    #[error("cannot complete verification, missing: {}", join_missing(.missing))]
    IncompleteInputs { missing: Vec<MissingInput> },

    #[error("both officers must verify this action first")]
    QuorumNotReached,

    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: Operation,
        state: WorkflowState,
    },

    #[error("officer {officer} could not be authenticated")]
    AuthenticationFailed { officer: OfficerId },

    #[error("officer authentication unavailable: {0}")]
    Identity(#[from] IdentityError),

    #[error("failed to save verification details, please try again: {0}")]
    Persistence(#[from] StoreError),
}

impl WorkflowError {
    /// Errors caused by a collaborator rather than by the inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Identity(_) | Self::Persistence(_))
    }
}

fn join_missing(missing: &[MissingInput]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
