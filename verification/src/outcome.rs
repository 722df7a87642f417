//! What a completed verification hands back to its caller.

use std::fmt;

use votecheck_types::{Decision, Timestamp, VerificationMethod, VerificationRecord, VoterId};

/// Proof that the record was persisted, carrying the stored copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionReceipt {
    pub record: VerificationRecord,
}

impl CompletionReceipt {
    pub fn voter_id(&self) -> &VoterId {
        self.record.voter_id()
    }

    /// Update time assigned by the store.
    pub fn timestamp(&self) -> Timestamp {
        self.record.timestamp
    }

    pub fn decision(&self) -> Decision {
        self.record.decision()
    }

    pub fn summary(&self) -> CompletionSummary {
        let draft = &self.record.draft;
        CompletionSummary {
            voter_id: draft.voter_id.clone(),
            voter_name: draft.voter_name.clone(),
            decision: draft.decision,
            method: draft.method,
            officer_one: draft.officer_one_id.to_string(),
            officer_two: draft.officer_two_id.to_string(),
            timestamp: self.record.timestamp,
            notes: draft.notes.clone(),
        }
    }
}

/// The human-readable "verification complete" panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionSummary {
    pub voter_id: VoterId,
    pub voter_name: String,
    pub decision: Decision,
    pub method: VerificationMethod,
    pub officer_one: String,
    pub officer_two: String,
    pub timestamp: Timestamp,
    pub notes: String,
}

impl fmt::Display for CompletionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Verification complete")?;
        writeln!(f, "  Voter:      {} (#{})", self.voter_name, self.voter_id)?;
        writeln!(f, "  Decision:   {}", self.decision.label())?;
        writeln!(f, "  Method:     {}", self.method.label())?;
        writeln!(f, "  Officer 1:  {}", self.officer_one)?;
        writeln!(f, "  Officer 2:  {}", self.officer_two)?;
        writeln!(f, "  Recorded:   {}", self.timestamp)?;
        write!(f, "  Notes:      {}", self.notes)
    }
}
