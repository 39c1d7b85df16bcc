//! Columnar snapshot of the standardized raw batch.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::info;

use crate::error::Result;
use crate::parquet::{read_parquet, sha256_file, write_parquet_atomic};

/// What was written by [`write_snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    /// Hex SHA-256 of the written file.
    pub sha256: String,
}

/// Write the snapshot, fully replacing any previous one.
pub fn write_snapshot(df: &DataFrame, path: &Path) -> Result<SnapshotInfo> {
    write_parquet_atomic(df, path)?;
    let sha256 = sha256_file(path)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        sha256 = %sha256,
        "snapshot written"
    );
    Ok(SnapshotInfo {
        path: path.to_path_buf(),
        rows: df.height(),
        columns: df.width(),
        sha256,
    })
}

/// Read a snapshot written by [`write_snapshot`].
pub fn read_snapshot(path: &Path) -> Result<DataFrame> {
    read_parquet(path)
}
