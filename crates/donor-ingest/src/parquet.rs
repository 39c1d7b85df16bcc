//! Parquet read/write helpers shared by snapshots and relation stores.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, ParquetReader, ParquetWriter, SerReader};
use sha2::Digest;

use crate::error::{IngestError, Result};

/// Write `df` to `path`, replacing any existing file.
///
/// The frame is written to a sibling temp file first and then renamed, so a
/// failed write leaves the previous file in place.
pub fn write_parquet_atomic(df: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| IngestError::FileWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let tmp = temp_path(path);
    let written = (|| -> Result<()> {
        let mut file = File::create(&tmp).map_err(|e| IngestError::FileWrite {
            path: tmp.clone(),
            source: e,
        })?;
        let mut frame = df.clone();
        ParquetWriter::new(&mut file)
            .finish(&mut frame)
            .map_err(|e| IngestError::Parquet {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        file.sync_all().map_err(|e| IngestError::FileWrite {
            path: tmp.clone(),
            source: e,
        })
    })();

    if let Err(error) = written {
        let _ = fs::remove_file(&tmp);
        return Err(error);
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        IngestError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        }
    })
}

/// Read a Parquet file into a `DataFrame`.
pub fn read_parquet(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    ParquetReader::new(file)
        .finish()
        .map_err(|e| IngestError::Parquet {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Hex-encoded SHA-256 of a file's contents.
pub fn sha256_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| IngestError::open(path, e))?;
    Ok(hex::encode(sha2::Sha256::digest(&bytes)))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".tmp-{}", std::process::id()));
    path.with_file_name(name)
}
