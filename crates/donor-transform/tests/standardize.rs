//! Property tests for batch standardization.

use donor_model::{CANONICAL_FIELDS, DATE_FIELDS, field};
use donor_transform::{normalize_phone, standardize};
use polars::prelude::{Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::{Just, Strategy, prop_assert, prop_assert_eq, prop_oneof, proptest};

type RawRow = Vec<Option<String>>;

fn date_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}",
        "[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}",
        Just("31/13/2020".to_string()),
        ".{0,10}",
    ]
}

fn phone_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{6,12}",
        "[0-9]{6,10}\\.0",
        "\\+?[0-9]{2,3}( [0-9]{2}){3}",
        "(NaN|nan|<NA>|null|None)",
        ".{0,10}",
    ]
}

fn raw_row() -> impl Strategy<Value = RawRow> {
    (
        vec(option::of(".{0,12}"), CANONICAL_FIELDS.len()),
        option::of(date_text()),
        option::of(date_text()),
        option::of(phone_text()),
    )
        .prop_map(|(mut row, birth, last, phone)| {
            for (idx, name) in CANONICAL_FIELDS.iter().enumerate() {
                match *name {
                    field::BIRTH_DATE => row[idx] = birth.clone(),
                    field::LAST_DONATION_DATE => row[idx] = last.clone(),
                    field::PHONE => row[idx] = phone.clone(),
                    _ => {}
                }
            }
            row
        })
}

fn batch(rows: &[RawRow]) -> DataFrame {
    let columns: Vec<Column> = CANONICAL_FIELDS
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let values: Vec<Option<String>> = rows.iter().map(|row| row[col].clone()).collect();
            Series::new((*name).into(), values).into_column()
        })
        .collect();
    DataFrame::new(columns).expect("build batch")
}

proptest! {
    #[test]
    fn standardize_preserves_row_count(rows in vec(raw_row(), 0..40)) {
        let raw = batch(&rows);
        let standardized = standardize(&raw).expect("standardize");
        prop_assert_eq!(standardized.height(), raw.height());
    }

    #[test]
    fn dates_are_present_or_sentinel(rows in vec(raw_row(), 0..40)) {
        let standardized = standardize(&batch(&rows)).expect("standardize");
        for name in DATE_FIELDS {
            let column = standardized.column(name).expect("date column");
            prop_assert_eq!(column.dtype(), &DataType::Date);
        }
    }

    #[test]
    fn phone_standardization_is_idempotent(rows in vec(raw_row(), 0..40)) {
        let once = standardize(&batch(&rows)).expect("first pass");
        let twice = standardize(&once).expect("second pass");
        let first = once.column(field::PHONE).expect("phone").as_materialized_series();
        let second = twice.column(field::PHONE).expect("phone").as_materialized_series();
        prop_assert!(first.equals_missing(second));
    }

    #[test]
    fn normalized_phone_is_digits_only(raw in phone_text()) {
        let normalized = normalize_phone(&raw);
        prop_assert!(normalized.chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(normalize_phone(&normalized), normalized);
    }
}

#[test]
fn malformed_date_becomes_sentinel_without_error() {
    let mut row: RawRow = vec![Some("x".to_string()); CANONICAL_FIELDS.len()];
    let birth = CANONICAL_FIELDS
        .iter()
        .position(|name| *name == field::BIRTH_DATE)
        .expect("birth date field");
    row[birth] = Some("31/13/2020".to_string());

    let standardized = standardize(&batch(&[row])).expect("standardize");

    let column = standardized.column(field::BIRTH_DATE).expect("birth date");
    assert_eq!(column.null_count(), 1);
}
