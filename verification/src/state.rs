//! Workflow states and officer attestations.

use std::fmt;
use votecheck_types::OfficerId;

/// Where a manual verification currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    /// Opened; the first officer has not authenticated.
    AwaitingOfficerOne,
    /// The first officer's credential is being checked.
    OfficerOneVerifying,
    /// First officer verified; waiting for a different second officer.
    AwaitingOfficerTwo,
    /// The second officer's credential is being checked.
    OfficerTwoVerifying,
    /// Quorum reached; decision, method and notes may be edited.
    ReadyToDecide,
    /// The record write is in flight.
    Processing,
    /// The record was persisted.
    Complete,
    /// The record write failed.
    PersistFailed,
}

impl WorkflowState {
    /// Both officers are verified in this state.
    pub fn has_quorum(&self) -> bool {
        matches!(
            self,
            Self::ReadyToDecide | Self::Processing | Self::Complete | Self::PersistFailed
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::PersistFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingOfficerOne => "awaiting officer one",
            Self::OfficerOneVerifying => "verifying officer one",
            Self::AwaitingOfficerTwo => "awaiting officer two",
            Self::OfficerTwoVerifying => "verifying officer two",
            Self::ReadyToDecide => "ready to decide",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::PersistFailed => "persist failed",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One officer's credential check. The credential itself is never kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OfficerAttestation {
    pub officer_id: OfficerId,
    pub verified: bool,
}

impl OfficerAttestation {
    pub fn pending(officer_id: OfficerId) -> Self {
        Self {
            officer_id,
            verified: false,
        }
    }
}
