//! Schema standardization for donor batches.
//!
//! This crate coerces a raw batch into the canonical donor schema:
//!
//! - **datetime**: tolerant calendar-date parsing
//! - **phone**: digits-only phone text with placeholder stripping
//! - **numeric**: integer identifiers and floating-point coordinates
//! - **standardize**: the batch-level entry point
//!
//! Malformed values never raise: they become the missing-value sentinel
//! (a null cell, or an empty string for the phone field). Only a missing
//! field or a column of an unconvertible type is an error.

mod error;
pub mod normalization;
mod standardize;

pub use error::{Result, SchemaError};
pub use normalization::{normalize_phone, parse_tolerant_date};
pub use standardize::{StandardizeReport, standardize, standardize_with_report};
