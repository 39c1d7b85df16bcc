//! Typed single-row view over a donor batch.

use chrono::NaiveDate;
use polars::prelude::{AnyValue, Column, DataFrame};
use serde::Serialize;

use crate::polars_utils::{any_to_date, any_to_f64, any_to_i64, any_to_string};
use crate::schema::field;

/// One donor record.
///
/// Every field is optional: a `None` is a null cell, a missing-date
/// sentinel, or a column absent from the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DonorRecord {
    pub id: Option<i64>,
    pub full_name: Option<String>,
    pub sex: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub blood_group: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub health_summary: Option<String>,
    pub last_donation_date: Option<NaiveDate>,
}

/// Reads `DonorRecord`s out of a `DataFrame`.
///
/// Columns are resolved once; absent columns read as `None` for every row.
#[derive(Debug)]
pub struct RecordReader<'a> {
    height: usize,
    id: Option<&'a Column>,
    full_name: Option<&'a Column>,
    sex: Option<&'a Column>,
    birth_date: Option<&'a Column>,
    blood_group: Option<&'a Column>,
    address: Option<&'a Column>,
    latitude: Option<&'a Column>,
    longitude: Option<&'a Column>,
    phone: Option<&'a Column>,
    health_summary: Option<&'a Column>,
    last_donation_date: Option<&'a Column>,
}

impl<'a> RecordReader<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        let column = |name: &str| df.column(name).ok();
        Self {
            height: df.height(),
            id: column(field::ID),
            full_name: column(field::FULL_NAME),
            sex: column(field::SEX),
            birth_date: column(field::BIRTH_DATE),
            blood_group: column(field::BLOOD_GROUP),
            address: column(field::ADDRESS),
            latitude: column(field::LATITUDE),
            longitude: column(field::LONGITUDE),
            phone: column(field::PHONE),
            health_summary: column(field::HEALTH_SUMMARY),
            last_donation_date: column(field::LAST_DONATION_DATE),
        }
    }

    /// Number of rows in the underlying batch.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read the record at `idx`. Out-of-bounds rows read as all-`None`.
    pub fn record(&self, idx: usize) -> DonorRecord {
        DonorRecord {
            id: cell(self.id, idx).and_then(any_to_i64),
            full_name: text(self.full_name, idx),
            sex: text(self.sex, idx),
            birth_date: cell(self.birth_date, idx).and_then(any_to_date),
            blood_group: text(self.blood_group, idx),
            address: text(self.address, idx),
            latitude: cell(self.latitude, idx).and_then(any_to_f64),
            longitude: cell(self.longitude, idx).and_then(any_to_f64),
            phone: text(self.phone, idx),
            health_summary: text(self.health_summary, idx),
            last_donation_date: cell(self.last_donation_date, idx).and_then(any_to_date),
        }
    }

    /// Iterate over every record in row order.
    pub fn records(&self) -> impl Iterator<Item = DonorRecord> + '_ {
        (0..self.height).map(|idx| self.record(idx))
    }
}

fn cell(column: Option<&Column>, idx: usize) -> Option<AnyValue<'_>> {
    match column?.get(idx) {
        Ok(AnyValue::Null) | Err(_) => None,
        Ok(value) => Some(value),
    }
}

/// Text cells keep their raw content; only nulls become `None`.
fn text(column: Option<&Column>, idx: usize) -> Option<String> {
    cell(column, idx).map(any_to_string)
}
