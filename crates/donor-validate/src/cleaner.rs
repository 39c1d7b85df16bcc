//! Rule-based row removal.

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::rules::{CLEANING_RULES, RecordRule};

/// Rows removed by one cleaning stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageDrop {
    pub rule: RecordRule,
    pub dropped: usize,
}

/// Outcome of [`clean`].
///
/// Stage counts are taken against the batch as it stood before that stage,
/// so a row failing several rules is counted once, by the first failing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropReport {
    pub input_rows: usize,
    pub stages: Vec<StageDrop>,
    pub kept_rows: usize,
    /// Kept rows whose sex code is neither `M`, `F` nor null. Advisory.
    pub invalid_sex: usize,
}

impl DropReport {
    /// Rows dropped by `rule`, zero when the rule is not a cleaning stage.
    pub fn dropped_by(&self, rule: RecordRule) -> usize {
        self.stages
            .iter()
            .filter(|stage| stage.rule == rule)
            .map(|stage| stage.dropped)
            .sum()
    }

    pub fn total_dropped(&self) -> usize {
        self.stages.iter().map(|stage| stage.dropped).sum()
    }
}

/// Remove rows failing the cleaning rules.
///
/// Rules apply in [`CLEANING_RULES`] order. Kept rows are returned unmodified
/// and in their original relative order.
pub fn clean(batch: &DataFrame) -> Result<(DataFrame, DropReport)> {
    let input_rows = batch.height();
    let mut current = batch.clone();
    let mut stages = Vec::with_capacity(CLEANING_RULES.len());

    for rule in CLEANING_RULES {
        let mask = rule.evaluate_batch(&current);
        let dropped = mask.iter().filter(|keep| !**keep).count();
        if dropped > 0 {
            let keep = BooleanChunked::from_slice("keep".into(), &mask);
            current = current.filter(&keep)?;
        }
        info!(rule = rule.label(), dropped, remaining = current.height(), "cleaning stage");
        stages.push(StageDrop { rule, dropped });
    }

    let invalid_sex = RecordRule::ValidSex
        .evaluate_batch(&current)
        .iter()
        .filter(|valid| !**valid)
        .count();
    if invalid_sex > 0 {
        debug!(invalid_sex, "kept rows with non-standard sex codes");
    }

    let report = DropReport {
        input_rows,
        stages,
        kept_rows: current.height(),
        invalid_sex,
    };
    Ok((current, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use donor_model::field;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn batch(rows: &[(Option<&str>, Option<&str>, Option<&str>, Option<&str>)]) -> DataFrame {
        let names: Vec<Option<&str>> = rows.iter().map(|r| r.0).collect();
        let groups: Vec<Option<&str>> = rows.iter().map(|r| r.1).collect();
        let births: Vec<Option<&str>> = rows.iter().map(|r| r.2).collect();
        let sexes: Vec<Option<&str>> = rows.iter().map(|r| r.3).collect();
        let donations: Vec<Option<&str>> = rows.iter().map(|_| Some("2024-01-10")).collect();
        DataFrame::new(vec![
            Series::new(field::FULL_NAME.into(), names).into_column(),
            Series::new(field::SEX.into(), sexes).into_column(),
            Series::new(field::BIRTH_DATE.into(), births).into_column(),
            Series::new(field::BLOOD_GROUP.into(), groups).into_column(),
            Series::new(field::LAST_DONATION_DATE.into(), donations).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn counts_each_row_once_against_the_first_failing_rule() {
        let df = batch(&[
            (Some("Awa"), Some("A+"), Some("1990-01-01"), Some("F")),
            // fails blood group and name; counted as blood group
            (Some(" "), Some("Q"), Some("1990-01-01"), Some("M")),
            (Some("Moussa"), Some("B-"), None, Some("M")),
            (Some(""), Some("O+"), Some("1985-03-04"), None),
            (Some("Fatou"), Some("AB+"), Some("1979-12-31"), Some("X")),
        ]);

        let (kept, report) = clean(&df).unwrap();
        assert_eq!(report.input_rows, 5);
        assert_eq!(report.dropped_by(RecordRule::ValidBloodGroup), 1);
        assert_eq!(report.dropped_by(RecordRule::RequiredDates), 1);
        assert_eq!(report.dropped_by(RecordRule::NonBlankName), 1);
        assert_eq!(report.dropped_by(RecordRule::ValidSex), 0);
        assert_eq!(report.kept_rows, 2);
        assert_eq!(report.invalid_sex, 1);
        assert_eq!(kept.height() + report.total_dropped(), df.height());

        let names = kept.column(field::FULL_NAME).unwrap().str().unwrap();
        assert_eq!(names.get(0), Some("Awa"));
        assert_eq!(names.get(1), Some("Fatou"));
    }

    #[test]
    fn empty_batch_yields_zero_counts() {
        let df = batch(&[]);
        let (kept, report) = clean(&df).unwrap();
        assert_eq!(kept.height(), 0);
        assert_eq!(report.total_dropped(), 0);
        assert_eq!(report.stages.len(), CLEANING_RULES.len());
        assert_eq!(report.invalid_sex, 0);
    }
}
