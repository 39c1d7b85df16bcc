//! Validation for donor batches.
//!
//! This crate decides which records are admissible and whether a clean batch
//! may be promoted to consumers:
//!
//! - **Record rules**: pure predicates over a single `DonorRecord`
//! - **Cleaner**: drops rows failing the blood-group, date and name rules,
//!   in that order, and reports per-rule counts
//! - **Quality gate**: volume, completeness and blood-group domain checks
//!   producing a PASS/FAIL verdict; duplicate ids are a warning only
//! - **Profile**: read-only anomaly summary used by the `inspect` command
//!
//! # Example
//!
//! ```ignore
//! use donor_validate::{QualityGate, GateConfig, clean};
//!
//! let (kept, drops) = clean(&standardized)?;
//! let report = QualityGate::new(GateConfig::default()).evaluate(&kept);
//! if !report.passed() {
//!     for reason in report.reasons() {
//!         eprintln!("{reason}");
//!     }
//! }
//! ```

mod cleaner;
mod column_reader;
mod error;
mod gate;
mod profile;
pub mod rules;

pub use cleaner::{DropReport, StageDrop, clean};
pub use column_reader::ColumnReader;
pub use error::{Result, ValidateError};
pub use gate::{
    DEFAULT_MIN_ROWS, GateConfig, GateWarning, MAX_EXAMPLES, QualityGate, QualityReport, Verdict,
    Violation,
};
pub use profile::{BatchProfile, ColumnProfile, ValueAnomaly, profile_batch};
pub use rules::{
    CLEANING_RULES, RecordRule, has_nonblank_name, has_required_dates, has_valid_blood_group,
    has_valid_sex,
};
