//! Source CSV reading.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::{debug, warn};

use crate::error::{IngestError, Result};

/// Anything that can hand the pipeline a raw donor batch.
pub trait BatchSource {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Read the whole batch into memory.
    fn read_batch(&self) -> Result<DataFrame>;
}

/// A delimited file on the local filesystem.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BatchSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read_batch(&self) -> Result<DataFrame> {
        read_donor_csv(&self.path)
    }
}

/// Check that a file is not UTF-16 encoded.
///
/// A UTF-8 BOM is accepted and removed from the header by [`read_donor_csv`].
pub fn validate_encoding(path: &Path) -> Result<()> {
    let mut file = File::open(path).map_err(|e| IngestError::open(path, e))?;
    let mut buffer = [0u8; 2];
    let bytes_read = file.read(&mut buffer).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    if bytes_read == 2 {
        if buffer == [0xFF, 0xFE] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 LE",
            });
        }
        if buffer == [0xFE, 0xFF] {
            return Err(IngestError::UnsupportedEncoding {
                path: path.to_path_buf(),
                encoding: "UTF-16 BE",
            });
        }
    }
    Ok(())
}

/// Read a donor CSV with every column as text.
///
/// Header names are trimmed and stripped of a leading BOM. Empty cells are
/// read as nulls.
pub fn read_donor_csv(path: &Path) -> Result<DataFrame> {
    validate_encoding(path)?;

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    for name in names {
        let cleaned = name.trim_start_matches('\u{feff}').trim();
        if cleaned != name {
            df.rename(&name, cleaned.into())
                .map_err(|e| IngestError::CsvParse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
        }
    }

    if df.height() == 0 {
        warn!(path = %path.display(), "source file has a header but no rows");
    }
    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "read source csv"
    );
    Ok(df)
}
