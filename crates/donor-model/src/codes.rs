//! Code sets for blood groups and sex.
//!
//! Matching is exact: values are compared as stored, without trimming or
//! case folding, so `"a+"` and `" A+"` are not valid blood groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
}

impl BloodGroup {
    /// All eight canonical groups.
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APos,
        BloodGroup::ANeg,
        BloodGroup::BPos,
        BloodGroup::BNeg,
        BloodGroup::AbPos,
        BloodGroup::AbNeg,
        BloodGroup::OPos,
        BloodGroup::ONeg,
    ];

    /// Code as written in the dataset.
    pub fn as_code(&self) -> &'static str {
        match self {
            BloodGroup::APos => "A+",
            BloodGroup::ANeg => "A-",
            BloodGroup::BPos => "B+",
            BloodGroup::BNeg => "B-",
            BloodGroup::AbPos => "AB+",
            BloodGroup::AbNeg => "AB-",
            BloodGroup::OPos => "O+",
            BloodGroup::ONeg => "O-",
        }
    }

    /// Parse an exact canonical code.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|group| group.as_code() == value)
    }

    /// Returns true if `value` is one of the eight canonical codes.
    pub fn is_canonical(value: &str) -> bool {
        Self::parse(value).is_some()
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// Donor sex code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SexCode {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl SexCode {
    pub fn as_code(&self) -> &'static str {
        match self {
            SexCode::Male => "M",
            SexCode::Female => "F",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "M" => Some(SexCode::Male),
            "F" => Some(SexCode::Female),
            _ => None,
        }
    }
}

impl fmt::Display for SexCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_group_codes_round_trip() {
        for group in BloodGroup::ALL {
            assert_eq!(BloodGroup::parse(group.as_code()), Some(group));
        }
    }

    #[test]
    fn blood_group_matching_is_exact() {
        assert!(BloodGroup::is_canonical("AB-"));
        assert!(!BloodGroup::is_canonical("ab-"));
        assert!(!BloodGroup::is_canonical(" A+"));
        assert!(!BloodGroup::is_canonical("Z+"));
        assert!(!BloodGroup::is_canonical(""));
    }

    #[test]
    fn blood_group_serializes_as_code() {
        let json = serde_json::to_string(&BloodGroup::AbNeg).unwrap();
        assert_eq!(json, "\"AB-\"");
    }

    #[test]
    fn sex_code_parse() {
        assert_eq!(SexCode::parse("M"), Some(SexCode::Male));
        assert_eq!(SexCode::parse("F"), Some(SexCode::Female));
        assert_eq!(SexCode::parse("X"), None);
        assert_eq!(SexCode::parse("m"), None);
    }
}
