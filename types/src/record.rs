//! The durable outcome of a manual verification.
//!
//! Field names on the wire are the ones the dashboard has always written to
//! the `voter_verifications` collection, so audit consumers reading those
//! documents keep working.

use crate::{AadhaarSuffix, Decision, OfficerId, Timestamp, VerificationMethod, VoterCase, VoterId};
use serde::{Deserialize, Serialize};

/// A verification record before the store has stamped it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDraft {
    pub voter_id: VoterId,
    pub voter_name: String,
    pub booth_number: u32,
    pub aadhaar_last_digits: AadhaarSuffix,
    #[serde(rename = "verificationStatus")]
    pub decision: Decision,
    #[serde(rename = "verificationMethod")]
    pub method: VerificationMethod,
    #[serde(rename = "verificationNotes")]
    pub notes: String,
    #[serde(rename = "officerOne")]
    pub officer_one_id: OfficerId,
    #[serde(rename = "officerTwo")]
    pub officer_two_id: OfficerId,
    /// Signed-in operator whose session ran the workflow.
    pub recorded_by: String,
}

impl RecordDraft {
    /// Copy the identifying fields out of `case` and attach the decision.
    pub fn new(
        case: &VoterCase,
        decision: Decision,
        method: VerificationMethod,
        notes: impl Into<String>,
        officer_one_id: OfficerId,
        officer_two_id: OfficerId,
        recorded_by: impl Into<String>,
    ) -> Self {
        Self {
            voter_id: case.id.clone(),
            voter_name: case.name.clone(),
            booth_number: case.booth_number,
            aadhaar_last_digits: case.aadhaar_last_digits,
            decision,
            method,
            notes: notes.into(),
            officer_one_id,
            officer_two_id,
            recorded_by: recorded_by.into(),
        }
    }
}

/// A stored verification record with its server-assigned timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    #[serde(flatten)]
    pub draft: RecordDraft,
    pub timestamp: Timestamp,
}

impl VerificationRecord {
    pub fn from_draft(draft: RecordDraft, timestamp: Timestamp) -> Self {
        Self { draft, timestamp }
    }

    pub fn voter_id(&self) -> &VoterId {
        &self.draft.voter_id
    }

    pub fn decision(&self) -> Decision {
        self.draft.decision
    }
}
