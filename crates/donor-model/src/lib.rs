//! Data model for blood-donation batches.
//!
//! A batch is a Polars `DataFrame` whose columns follow the canonical donor
//! schema defined in [`schema`]. This crate owns:
//!
//! - **schema**: canonical field names, required fields, relation names
//! - **codes**: blood-group and sex code sets
//! - **record**: `DonorRecord`, the typed single-row view of a batch
//! - **polars_utils**: `AnyValue` conversions shared by every stage

pub mod codes;
pub mod polars_utils;
pub mod record;
pub mod schema;

pub use codes::{BloodGroup, SexCode};
pub use polars_utils::{
    any_to_date, any_to_f64, any_to_i64, any_to_string, date_to_epoch_days, format_numeric,
    parse_f64, parse_i64,
};
pub use record::{DonorRecord, RecordReader};
pub use schema::{
    CANONICAL_FIELDS, CLEAN_RELATION, DATE_FIELDS, EXPORT_TABLE, GATE_REQUIRED_FIELDS,
    RAW_RELATION, field,
};
