//! Masked Aadhaar fragment.
//!
//! Only the last four digits of a national ID number are ever retained. The
//! full number is consumed at construction and never stored, displayed or
//! serialized.

use crate::TypesError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The last four digits of an Aadhaar number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub struct AadhaarSuffix([u8; 4]);

impl AadhaarSuffix {
    /// Number of digits retained.
    pub const LEN: usize = 4;

    /// Reduce a full Aadhaar number to its last four digits.
    ///
    /// Spaces and hyphens are ignored; any other non-digit is rejected, as is
    /// input with fewer than four digits.
    pub fn from_full_number(number: &str) -> Result<Self, TypesError> {
        let mut digits = Vec::with_capacity(12);
        for c in number.chars() {
            match c {
                '0'..='9' => digits.push(c as u8),
                ' ' | '-' => {}
                _ => {
                    return Err(TypesError::InvalidAadhaar(
                        "contains characters other than digits".to_string(),
                    ))
                }
            }
        }
        if digits.len() < Self::LEN {
            return Err(TypesError::InvalidAadhaar(format!(
                "need at least {} digits, got {}",
                Self::LEN,
                digits.len()
            )));
        }
        let tail = &digits[digits.len() - Self::LEN..];
        let mut suffix = [0u8; 4];
        suffix.copy_from_slice(tail);
        Ok(Self(suffix))
    }

    /// Parse an already-truncated four digit suffix.
    pub fn parse(suffix: &str) -> Result<Self, TypesError> {
        let bytes = suffix.as_bytes();
        if bytes.len() != Self::LEN || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(TypesError::InvalidAadhaar(format!(
                "suffix must be exactly {} digits",
                Self::LEN
            )));
        }
        let mut out = [0u8; 4];
        out.copy_from_slice(bytes);
        Ok(Self(out))
    }

    pub fn as_str(&self) -> &str {
        // Constructors only admit ASCII digits.
        std::str::from_utf8(&self.0).unwrap_or("????")
    }

    /// The display form, `XXXX-XXXX-dddd`.
    pub fn masked(&self) -> String {
        format!("XXXX-XXXX-{}", self.as_str())
    }
}

impl fmt::Display for AadhaarSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

impl fmt::Debug for AadhaarSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AadhaarSuffix({})", self.as_str())
    }
}

impl From<AadhaarSuffix> for String {
    fn from(s: AadhaarSuffix) -> Self {
        s.as_str().to_string()
    }
}

impl<'de> Deserialize<'de> for AadhaarSuffix {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
