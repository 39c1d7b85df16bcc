//! Donor data ingestion.
//!
//! This crate reads the source CSV into a Polars `DataFrame` and owns the
//! Parquet files the pipeline writes along the way.
//!
//! # Features
//!
//! - **CSV Loading**: every column is read as text so the standardization
//!   stage owns all type coercion
//! - **Snapshots**: the standardized raw batch is written once per run as a
//!   Parquet file, replacing the previous one
//! - **Atomic Parquet writes**: a file is written next to its destination and
//!   renamed into place, so readers never see a half-written file
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use donor_ingest::{read_donor_csv, write_snapshot};
//!
//! let raw = read_donor_csv(Path::new("data/raw/dataset_don_sang.csv"))?;
//! let info = write_snapshot(&raw, Path::new("data/lake/raw/don_sang_raw.parquet"))?;
//! ```

mod csv;
mod error;
mod parquet;
mod snapshot;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{BatchSource, CsvSource, read_donor_csv, validate_encoding};

// === Parquet ===
pub use parquet::{read_parquet, sha256_file, write_parquet_atomic};
pub use snapshot::{SnapshotInfo, read_snapshot, write_snapshot};
