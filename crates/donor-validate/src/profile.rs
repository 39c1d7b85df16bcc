//! Read-only batch profile.

use donor_model::{BloodGroup, DATE_FIELDS, SexCode, field};
use polars::prelude::DataFrame;
use serde::Serialize;

use crate::column_reader::ColumnReader;
use crate::gate::MAX_EXAMPLES;

/// Per-column shape of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: String,
    pub null_count: usize,
}

/// Out-of-domain values found in one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValueAnomaly {
    pub count: usize,
    pub examples: Vec<String>,
}

/// Summary of a batch for exploration. Nothing here affects cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchProfile {
    pub rows: usize,
    pub columns: Vec<ColumnProfile>,
    pub invalid_sex: ValueAnomaly,
    pub invalid_blood_groups: ValueAnomaly,
    /// Null counts of the date fields, in field order. An absent column counts
    /// every row as missing.
    pub missing_dates: Vec<(String, usize)>,
}

pub fn profile_batch(batch: &DataFrame) -> BatchProfile {
    let reader = ColumnReader::new(batch);
    let columns = batch
        .get_columns()
        .iter()
        .map(|column| ColumnProfile {
            name: column.name().to_string(),
            dtype: column.dtype().to_string(),
            null_count: column.null_count(),
        })
        .collect();

    let anomaly = |name: &str, valid: fn(&str) -> bool| {
        let (count, examples) = reader.collect_matching(name, |v| !valid(v), MAX_EXAMPLES);
        ValueAnomaly { count, examples }
    };

    BatchProfile {
        rows: batch.height(),
        columns,
        invalid_sex: anomaly(field::SEX, |v| SexCode::parse(v).is_some()),
        invalid_blood_groups: anomaly(field::BLOOD_GROUP, BloodGroup::is_canonical),
        missing_dates: DATE_FIELDS
            .iter()
            .map(|name| ((*name).to_string(), reader.count_nulls(name).unwrap_or(batch.height())))
            .collect(),
    }
}
