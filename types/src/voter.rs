//! Voter cases as handed to the manual verification workflow.

use crate::{AadhaarSuffix, TypesError};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Stable identifier of a voter case; also the record store key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VoterId(String);

impl VoterId {
    pub fn parse(raw: &str) -> Result<Self, TypesError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyVoterId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for VoterId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for VoterId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for VoterId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(u64),
            Str(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Ok(Self::from(n)),
            Raw::Str(s) => Self::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Outcome of the upstream automatic check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Verified,
    /// Flagged for human review.
    ManualCheck,
}

/// The subject of a manual verification.
///
/// Cases are created upstream and are read-only to the workflow. A manual
/// check reason only exists while the case is flagged; it is dropped when a
/// verified case is read or written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CaseFields", into = "CaseFields")]
pub struct VoterCase {
    pub id: VoterId,
    pub name: String,
    pub voter_id_code: String,
    pub verification_status: VerificationStatus,
    manual_check_reason: Option<String>,
    pub booth_number: u32,
    pub aadhaar_last_digits: AadhaarSuffix,
}

/// Wire form of [`VoterCase`].
#[derive(Serialize, Deserialize)]
struct CaseFields {
    id: VoterId,
    name: String,
    voter_id_code: String,
    verification_status: VerificationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manual_check_reason: Option<String>,
    booth_number: u32,
    aadhaar_last_digits: AadhaarSuffix,
}

impl From<CaseFields> for VoterCase {
    fn from(fields: CaseFields) -> Self {
        let manual_check_reason = match fields.verification_status {
            VerificationStatus::ManualCheck => fields
                .manual_check_reason
                .filter(|reason| !reason.trim().is_empty()),
            VerificationStatus::Verified => None,
        };
        Self {
            id: fields.id,
            name: fields.name,
            voter_id_code: fields.voter_id_code,
            verification_status: fields.verification_status,
            manual_check_reason,
            booth_number: fields.booth_number,
            aadhaar_last_digits: fields.aadhaar_last_digits,
        }
    }
}

impl From<VoterCase> for CaseFields {
    fn from(case: VoterCase) -> Self {
        Self {
            manual_check_reason: case.manual_check_reason().map(str::to_string),
            id: case.id,
            name: case.name,
            voter_id_code: case.voter_id_code,
            verification_status: case.verification_status,
            booth_number: case.booth_number,
            aadhaar_last_digits: case.aadhaar_last_digits,
        }
    }
}

impl VoterCase {
    /// Build a verified case from an entry of a constituency roll.
    ///
    /// `index` is the zero-based roll position: the case id is `index + 1` and
    /// the voter id code is `V{1000 + index}`. The full Aadhaar number is
    /// reduced to its last four digits here and goes no further.
    pub fn from_roll_entry(
        index: u64,
        name: impl Into<String>,
        aadhaar_number: &str,
        booth_number: u32,
    ) -> Result<Self, TypesError> {
        Ok(Self {
            id: VoterId::from(index + 1),
            name: name.into(),
            voter_id_code: format!("V{}", 1000 + index),
            verification_status: VerificationStatus::Verified,
            manual_check_reason: None,
            booth_number,
            aadhaar_last_digits: AadhaarSuffix::from_full_number(aadhaar_number)?,
        })
    }

    /// Mark the case as requiring manual review.
    pub fn flag_for_manual_check(mut self, reason: impl Into<String>) -> Self {
        let reason: String = reason.into();
        self.verification_status = VerificationStatus::ManualCheck;
        self.manual_check_reason = (!reason.trim().is_empty()).then_some(reason);
        self
    }

    /// The reason for review; `None` unless the case is flagged.
    pub fn manual_check_reason(&self) -> Option<&str> {
        match self.verification_status {
            VerificationStatus::ManualCheck => self.manual_check_reason.as_deref(),
            VerificationStatus::Verified => None,
        }
    }

    pub fn needs_manual_check(&self) -> bool {
        self.verification_status == VerificationStatus::ManualCheck
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roll_entry_follows_list_numbering() {
        let case = VoterCase::from_roll_entry(4, "Asha Rao", "9876 5432 1098", 7).unwrap();
        assert_eq!(case.id, VoterId::from(5));
        assert_eq!(case.voter_id_code, "V1004");
        assert_eq!(case.aadhaar_last_digits.as_str(), "1098");
        assert!(!case.needs_manual_check());
        assert_eq!(case.manual_check_reason(), None);
    }

    #[test]
    fn reason_only_visible_when_flagged() {
        let case = VoterCase::from_roll_entry(0, "Ravi", "111122223333", 1)
            .unwrap()
            .flag_for_manual_check("Fingerprint mismatch");
        assert!(case.needs_manual_check());
        assert_eq!(case.manual_check_reason(), Some("Fingerprint mismatch"));

        let mut cleared = case.clone();
        cleared.verification_status = VerificationStatus::Verified;
        assert_eq!(cleared.manual_check_reason(), None);
    }

    #[test]
    fn verified_cases_drop_a_stray_reason() {
        let json = r#"{
            "id": 3,
            "name": "Meera",
            "voter_id_code": "V1002",
            "verification_status": "verified",
            "manual_check_reason": "Photo mismatch",
            "booth_number": 2,
            "aadhaar_last_digits": "4444"
        }"#;
        let case: VoterCase = serde_json::from_str(json).unwrap();
        assert_eq!(case.manual_check_reason(), None);
        let out = serde_json::to_string(&case).unwrap();
        assert!(!out.contains("manual_check_reason"));
    }

    #[test]
    fn unflagging_stops_the_reason_being_written() {
        let mut case = VoterCase::from_roll_entry(0, "Ravi", "111122223333", 1)
            .unwrap()
            .flag_for_manual_check("Fingerprint mismatch");
        let flagged = serde_json::to_string(&case).unwrap();
        assert!(flagged.contains("Fingerprint mismatch"));
        assert_eq!(serde_json::from_str::<VoterCase>(&flagged).unwrap(), case);

        case.verification_status = VerificationStatus::Verified;
        assert!(!serde_json::to_string(&case).unwrap().contains("Fingerprint"));
    }

    #[test]
    fn voter_id_accepts_numbers_and_strings() {
        let from_int: VoterId = serde_json::from_str("12").unwrap();
        let from_str: VoterId = serde_json::from_str("\"12\"").unwrap();
        assert_eq!(from_int, from_str);
        assert!(serde_json::from_str::<VoterId>("\"  \"").is_err());
    }

    #[test]
    fn serialized_case_never_contains_full_number() {
        let case = VoterCase::from_roll_entry(0, "Ravi", "1111 2222 3333", 1).unwrap();
        let json = serde_json::to_string(&case).unwrap();
        assert!(json.contains("\"3333\""));
        assert!(!json.contains("1111"));
    }
}
