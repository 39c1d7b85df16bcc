//! Record-level rules.
//!
//! Each predicate looks at one record and nothing else. The cleaner and the
//! quality gate share these definitions through [`RecordRule`].

use donor_model::{BloodGroup, DonorRecord, RecordReader, SexCode};
use polars::prelude::DataFrame;
use serde::Serialize;

/// Sex code is `M`, `F` or null.
pub fn has_valid_sex(record: &DonorRecord) -> bool {
    record
        .sex
        .as_deref()
        .is_none_or(|sex| SexCode::parse(sex).is_some())
}

/// Blood group is one of the eight canonical codes. Null is invalid.
pub fn has_valid_blood_group(record: &DonorRecord) -> bool {
    record
        .blood_group
        .as_deref()
        .is_some_and(BloodGroup::is_canonical)
}

/// Both birth date and last-donation date are present.
pub fn has_required_dates(record: &DonorRecord) -> bool {
    record.birth_date.is_some() && record.last_donation_date.is_some()
}

/// Full name is present and not blank after trimming.
pub fn has_nonblank_name(record: &DonorRecord) -> bool {
    record
        .full_name
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty())
}

/// A named record rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordRule {
    ValidBloodGroup,
    RequiredDates,
    NonBlankName,
    ValidSex,
}

/// Drop rules applied by the cleaner, in application order.
///
/// Sex validity is deliberately absent: invalid sex codes are tolerated in
/// the clean batch and only reported.
pub const CLEANING_RULES: [RecordRule; 3] = [
    RecordRule::ValidBloodGroup,
    RecordRule::RequiredDates,
    RecordRule::NonBlankName,
];

impl RecordRule {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RecordRule::ValidBloodGroup => "invalid blood group",
            RecordRule::RequiredDates => "missing dates",
            RecordRule::NonBlankName => "blank name",
            RecordRule::ValidSex => "invalid sex code",
        }
    }

    /// Apply the rule to one record.
    pub fn check(&self, record: &DonorRecord) -> bool {
        match self {
            RecordRule::ValidBloodGroup => has_valid_blood_group(record),
            RecordRule::RequiredDates => has_required_dates(record),
            RecordRule::NonBlankName => has_nonblank_name(record),
            RecordRule::ValidSex => has_valid_sex(record),
        }
    }

    /// Apply the rule to every row of a batch, in row order.
    pub fn evaluate_batch(&self, batch: &DataFrame) -> Vec<bool> {
        RecordReader::new(batch)
            .records()
            .map(|record| self.check(&record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn valid_record() -> DonorRecord {
        DonorRecord {
            id: Some(1),
            full_name: Some("Awa Diop".to_string()),
            sex: Some("F".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 17),
            blood_group: Some("O+".to_string()),
            last_donation_date: NaiveDate::from_ymd_opt(2024, 1, 10),
            ..DonorRecord::default()
        }
    }

    #[test]
    fn sex_accepts_codes_and_null() {
        let mut record = valid_record();
        assert!(has_valid_sex(&record));
        record.sex = None;
        assert!(has_valid_sex(&record));
        record.sex = Some("X".to_string());
        assert!(!has_valid_sex(&record));
        record.sex = Some(String::new());
        assert!(!has_valid_sex(&record));
    }

    #[test]
    fn blood_group_rejects_null_and_unknown() {
        let mut record = valid_record();
        assert!(has_valid_blood_group(&record));
        record.blood_group = None;
        assert!(!has_valid_blood_group(&record));
        record.blood_group = Some("Z+".to_string());
        assert!(!has_valid_blood_group(&record));
    }

    #[test]
    fn dates_require_both_values() {
        let mut record = valid_record();
        assert!(has_required_dates(&record));
        record.last_donation_date = None;
        assert!(!has_required_dates(&record));
        record = valid_record();
        record.birth_date = None;
        assert!(!has_required_dates(&record));
    }

    #[test]
    fn name_must_not_be_blank() {
        let mut record = valid_record();
        assert!(has_nonblank_name(&record));
        record.full_name = Some(" \t ".to_string());
        assert!(!has_nonblank_name(&record));
        record.full_name = None;
        assert!(!has_nonblank_name(&record));
    }

    #[test]
    fn rules_are_independent() {
        let record = DonorRecord {
            full_name: Some("   ".to_string()),
            blood_group: Some("AB+".to_string()),
            ..DonorRecord::default()
        };
        assert!(RecordRule::ValidBloodGroup.check(&record));
        assert!(!RecordRule::RequiredDates.check(&record));
        assert!(!RecordRule::NonBlankName.check(&record));
        assert!(RecordRule::ValidSex.check(&record));
    }
}
