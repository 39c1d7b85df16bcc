//! Canonical donor schema.
//!
//! Column names are kept exactly as they appear in the source file header so
//! the raw and clean relations stay readable by existing consumers.

/// Canonical column names.
pub mod field {
    pub const ID: &str = "id";
    pub const FULL_NAME: &str = "nom_complet";
    pub const SEX: &str = "sexe";
    pub const BIRTH_DATE: &str = "date_naissance";
    pub const BLOOD_GROUP: &str = "groupe_sanguin";
    pub const ADDRESS: &str = "adresse";
    pub const LATITUDE: &str = "latitude_region";
    pub const LONGITUDE: &str = "longitude_region";
    pub const PHONE: &str = "telephone";
    pub const HEALTH_SUMMARY: &str = "bilan_sante";
    pub const LAST_DONATION_DATE: &str = "date_dernier_don";
}

/// Every field a raw batch must carry, in source header order.
pub const CANONICAL_FIELDS: [&str; 11] = [
    field::ID,
    field::FULL_NAME,
    field::SEX,
    field::BIRTH_DATE,
    field::BLOOD_GROUP,
    field::ADDRESS,
    field::LATITUDE,
    field::LONGITUDE,
    field::PHONE,
    field::HEALTH_SUMMARY,
    field::LAST_DONATION_DATE,
];

/// Calendar-date fields.
pub const DATE_FIELDS: [&str; 2] = [field::BIRTH_DATE, field::LAST_DONATION_DATE];

/// Fields the quality gate requires to be fully populated, in report order.
pub const GATE_REQUIRED_FIELDS: [&str; 5] = [
    field::ID,
    field::FULL_NAME,
    field::BLOOD_GROUP,
    field::BIRTH_DATE,
    field::LAST_DONATION_DATE,
];

/// Relation holding the standardized raw batch.
pub const RAW_RELATION: &str = "don_sang_raw";

/// Relation holding the clean artifact.
pub const CLEAN_RELATION: &str = "don_sang_clean";

/// Table name used at the export destination.
pub const EXPORT_TABLE: &str = "don_sang_clean";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_and_date_fields_are_canonical() {
        for name in GATE_REQUIRED_FIELDS.iter().chain(DATE_FIELDS.iter()) {
            assert!(CANONICAL_FIELDS.contains(name), "{name} is not canonical");
        }
    }
}
