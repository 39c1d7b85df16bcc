//! Quality gate for clean batches.
//!
//! The gate decides whether a clean batch may be promoted. Every check runs
//! on every evaluation; the verdict is only computed once all findings are in.

use std::fmt;

use donor_model::{GATE_REQUIRED_FIELDS, RecordReader, field};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::column_reader::ColumnReader;
use crate::rules::RecordRule;

/// Default minimum row count for a PASS.
pub const DEFAULT_MIN_ROWS: usize = 900;

/// Maximum number of distinct offending values quoted in a reason.
pub const MAX_EXAMPLES: usize = 5;

/// Gate thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GateConfig {
    pub min_rows: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_rows: DEFAULT_MIN_ROWS,
        }
    }
}

/// A failed gate check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    InsufficientRows { count: usize, threshold: usize },
    MissingColumn { column: String },
    NullValues { column: String, null_count: usize },
    InvalidBloodGroups { count: usize, examples: Vec<String> },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::InsufficientRows { count, threshold } => {
                write!(f, "insufficient volume: {count} rows (minimum {threshold})")
            }
            Violation::MissingColumn { column } => {
                write!(f, "required column {column} is missing")
            }
            Violation::NullValues { column, null_count } => {
                write!(f, "required column {column} has {null_count} null values")
            }
            Violation::InvalidBloodGroups { count, examples } => {
                let quoted: Vec<String> = examples.iter().map(|v| format!("{v:?}")).collect();
                write!(
                    f,
                    "{count} invalid blood group values (e.g., {})",
                    quoted.join(", ")
                )
            }
        }
    }
}

/// An advisory finding. Warnings never affect the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GateWarning {
    DuplicateIds { count: usize },
}

impl fmt::Display for GateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateWarning::DuplicateIds { count } => write!(f, "{count} duplicate ids"),
        }
    }
}

/// Gate outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail { reasons: Vec<Violation> },
}

impl Verdict {
    fn from_reasons(reasons: Vec<Violation>) -> Self {
        if reasons.is_empty() {
            Verdict::Pass
        } else {
            Verdict::Fail { reasons }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail { .. } => "FAIL",
        }
    }
}

/// Full result of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QualityReport {
    pub rows: usize,
    pub verdict: Verdict,
    pub warnings: Vec<GateWarning>,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        matches!(self.verdict, Verdict::Pass)
    }

    /// Violations in report order; empty on PASS.
    pub fn reasons(&self) -> &[Violation] {
        match &self.verdict {
            Verdict::Pass => &[],
            Verdict::Fail { reasons } => reasons,
        }
    }
}

/// Evaluates clean batches against a [`GateConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityGate {
    config: GateConfig,
}

impl QualityGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    /// Run every check. Reasons are ordered volume, completeness (in
    /// required-field order), then blood-group domain.
    pub fn evaluate(&self, batch: &DataFrame) -> QualityReport {
        let reader = ColumnReader::new(batch);
        let mut reasons = Vec::new();

        if let Some(violation) = self.check_volume(&reader) {
            reasons.push(violation);
        }
        reasons.extend(check_completeness(&reader));
        if let Some(violation) = check_blood_groups(batch) {
            reasons.push(violation);
        }

        let mut warnings = Vec::new();
        let duplicates = reader.duplicate_count(field::ID);
        if duplicates > 0 {
            warn!(duplicates, "duplicate donor ids");
            warnings.push(GateWarning::DuplicateIds { count: duplicates });
        }

        let verdict = Verdict::from_reasons(reasons);
        info!(
            rows = reader.height(),
            verdict = verdict.label(),
            warnings = warnings.len(),
            "quality gate evaluated"
        );
        QualityReport {
            rows: reader.height(),
            verdict,
            warnings,
        }
    }

    fn check_volume(&self, reader: &ColumnReader<'_>) -> Option<Violation> {
        let count = reader.height();
        debug!(count, threshold = self.config.min_rows, "volume check");
        (count < self.config.min_rows).then_some(Violation::InsufficientRows {
            count,
            threshold: self.config.min_rows,
        })
    }
}

fn check_completeness(reader: &ColumnReader<'_>) -> Vec<Violation> {
    GATE_REQUIRED_FIELDS
        .iter()
        .filter_map(|column| match reader.count_nulls(column) {
            None => Some(Violation::MissingColumn {
                column: (*column).to_string(),
            }),
            Some(0) => None,
            Some(null_count) => Some(Violation::NullValues {
                column: (*column).to_string(),
                null_count,
            }),
        })
        .collect()
}

/// Applies the cleaner's blood-group rule to every non-null value.
fn check_blood_groups(batch: &DataFrame) -> Option<Violation> {
    let rule = RecordRule::ValidBloodGroup;
    let mut count = 0usize;
    let mut examples: Vec<String> = Vec::with_capacity(MAX_EXAMPLES);
    for record in RecordReader::new(batch).records() {
        // Nulls belong to the completeness check.
        let Some(value) = record.blood_group.as_deref() else {
            continue;
        };
        if rule.check(&record) {
            continue;
        }
        count += 1;
        if examples.len() < MAX_EXAMPLES && !examples.iter().any(|seen| seen == value) {
            examples.push(value.to_string());
        }
    }
    (count > 0).then_some(Violation::InvalidBloodGroups { count, examples })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn violation_messages() {
        let volume = Violation::InsufficientRows {
            count: 500,
            threshold: 900,
        };
        insta::assert_snapshot!(volume.to_string(), @"insufficient volume: 500 rows (minimum 900)");

        let nulls = Violation::NullValues {
            column: "date_naissance".to_string(),
            null_count: 3,
        };
        insta::assert_snapshot!(nulls.to_string(), @"required column date_naissance has 3 null values");

        let domain = Violation::InvalidBloodGroups {
            count: 4,
            examples: vec!["Z+".to_string(), "a+".to_string()],
        };
        insta::assert_snapshot!(domain.to_string(), @r#"4 invalid blood group values (e.g., "Z+", "a+")"#);
    }

    #[test]
    fn verdict_serializes_with_status_tag() {
        let report = QualityReport {
            rows: 10,
            verdict: Verdict::Fail {
                reasons: vec![Violation::MissingColumn {
                    column: "id".to_string(),
                }],
            },
            warnings: vec![GateWarning::DuplicateIds { count: 2 }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["verdict"]["status"], "FAIL");
        assert_eq!(json["verdict"]["reasons"][0]["kind"], "missing_column");
        assert_eq!(json["warnings"][0]["count"], 2);
        assert!(!report.passed());
        assert_eq!(report.reasons().len(), 1);
    }
}
