//! Batch-level standardization into the canonical donor schema.

use std::collections::BTreeMap;

use donor_model::{
    CANONICAL_FIELDS, DATE_FIELDS, any_to_date, any_to_string, date_to_epoch_days, field,
};
use polars::prelude::{AnyValue, Column, DataFrame, DataType, NamedFrom, Series};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::normalization::{coerce_f64, coerce_i64, normalize_phone, parse_tolerant_date};

/// Sentinel conversions made while standardizing a batch.
///
/// Counts only values that were present in the input and degraded to the
/// missing-value sentinel; cells that were already null are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StandardizeReport {
    pub rows: usize,
    /// Unparseable date values per date field.
    pub invalid_dates: BTreeMap<String, usize>,
    /// Non-empty phone values that could not be read as a number.
    pub invalid_phones: usize,
    /// Unparseable numeric values per numeric field.
    pub invalid_numbers: BTreeMap<String, usize>,
}

impl StandardizeReport {
    pub fn total_invalid_dates(&self) -> usize {
        self.invalid_dates.values().sum()
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Date,
    Integer,
    Float,
    Phone,
    PassThrough,
}

fn field_kind(name: &str) -> FieldKind {
    match name {
        field::BIRTH_DATE | field::LAST_DONATION_DATE => FieldKind::Date,
        field::ID => FieldKind::Integer,
        field::LATITUDE | field::LONGITUDE => FieldKind::Float,
        field::PHONE => FieldKind::Phone,
        _ => FieldKind::PassThrough,
    }
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn accepts(kind: FieldKind, dtype: &DataType) -> bool {
    match kind {
        FieldKind::Date => matches!(
            dtype,
            DataType::String | DataType::Date | DataType::Datetime(_, _) | DataType::Null
        ),
        FieldKind::Integer | FieldKind::Float | FieldKind::Phone => {
            matches!(dtype, DataType::String | DataType::Null) || is_numeric_dtype(dtype)
        }
        FieldKind::PassThrough => true,
    }
}

/// Check every canonical field is present with a convertible type.
fn ensure_schema(batch: &DataFrame) -> Result<()> {
    for name in CANONICAL_FIELDS {
        let column = batch.column(name).map_err(|_| SchemaError::MissingField {
            field: name.to_string(),
        })?;
        if !accepts(field_kind(name), column.dtype()) {
            return Err(SchemaError::UnconvertibleType {
                field: name.to_string(),
                dtype: column.dtype().to_string(),
            });
        }
    }
    Ok(())
}

/// Standardize a raw batch. The input is left untouched.
pub fn standardize(batch: &DataFrame) -> Result<DataFrame> {
    standardize_with_report(batch).map(|(standardized, _)| standardized)
}

/// Standardize a raw batch and report how many values degraded to sentinels.
pub fn standardize_with_report(batch: &DataFrame) -> Result<(DataFrame, StandardizeReport)> {
    ensure_schema(batch)?;

    let mut report = StandardizeReport {
        rows: batch.height(),
        ..StandardizeReport::default()
    };
    let mut output = batch.clone();

    for name in DATE_FIELDS {
        let (series, invalid) = standardize_dates(batch.column(name)?, name)?;
        output.with_column(series)?;
        report.invalid_dates.insert(name.to_string(), invalid);
    }

    let (series, invalid) = standardize_integers(batch.column(field::ID)?, field::ID);
    output.with_column(series)?;
    report.invalid_numbers.insert(field::ID.to_string(), invalid);

    for name in [field::LATITUDE, field::LONGITUDE] {
        let (series, invalid) = standardize_floats(batch.column(name)?, name);
        output.with_column(series)?;
        report.invalid_numbers.insert(name.to_string(), invalid);
    }

    let (series, invalid) = standardize_phones(batch.column(field::PHONE)?);
    output.with_column(series)?;
    report.invalid_phones = invalid;

    debug!(
        rows = report.rows,
        invalid_dates = report.total_invalid_dates(),
        invalid_phones = report.invalid_phones,
        "standardized batch"
    );
    Ok((output, report))
}

fn cell(column: &Column, idx: usize) -> AnyValue<'_> {
    column.get(idx).unwrap_or(AnyValue::Null)
}

fn standardize_dates(column: &Column, name: &str) -> Result<(Series, usize)> {
    let mut invalid = 0usize;
    let days: Vec<Option<i32>> = (0..column.len())
        .map(|idx| {
            let value = cell(column, idx);
            let parsed = match &value {
                AnyValue::Null => return None,
                AnyValue::String(s) => parse_tolerant_date(s),
                AnyValue::StringOwned(s) => parse_tolerant_date(s),
                _ => any_to_date(value.clone()),
            };
            if parsed.is_none() {
                invalid += 1;
            }
            parsed.map(date_to_epoch_days)
        })
        .collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    Ok((series, invalid))
}

fn standardize_integers(column: &Column, name: &str) -> (Series, usize) {
    let mut invalid = 0usize;
    let values: Vec<Option<i64>> = (0..column.len())
        .map(|idx| {
            let value = cell(column, idx);
            if matches!(value, AnyValue::Null) {
                return None;
            }
            let coerced = coerce_i64(value);
            if coerced.is_none() {
                invalid += 1;
            }
            coerced
        })
        .collect();
    (Series::new(name.into(), values), invalid)
}

fn standardize_floats(column: &Column, name: &str) -> (Series, usize) {
    let mut invalid = 0usize;
    let values: Vec<Option<f64>> = (0..column.len())
        .map(|idx| {
            let value = cell(column, idx);
            if matches!(value, AnyValue::Null) {
                return None;
            }
            let coerced = coerce_f64(value);
            if coerced.is_none() {
                invalid += 1;
            }
            coerced
        })
        .collect();
    (Series::new(name.into(), values), invalid)
}

fn standardize_phones(column: &Column) -> (Series, usize) {
    let mut invalid = 0usize;
    let values: Vec<String> = (0..column.len())
        .map(|idx| {
            let raw = any_to_string(cell(column, idx));
            let normalized = normalize_phone(&raw);
            if normalized.is_empty() && !raw.trim().is_empty() {
                invalid += 1;
            }
            normalized
        })
        .collect();
    (Series::new(field::PHONE.into(), values), invalid)
}
