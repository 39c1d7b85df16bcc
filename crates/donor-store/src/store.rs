//! Named relation store.

use std::path::{Path, PathBuf};

use donor_ingest::{IngestError, read_parquet, write_parquet_atomic};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::{Result, StoreError};

/// A store of named relations with replace-only writes.
///
/// `replace` either fully replaces the relation or leaves the previous
/// content in place.
pub trait TableStore {
    /// Human-readable location for diagnostics.
    fn describe(&self) -> String;

    fn replace(&self, relation: &str, batch: &DataFrame) -> Result<()>;

    fn read(&self, relation: &str) -> Result<DataFrame>;

    fn row_count(&self, relation: &str) -> Result<usize> {
        self.read(relation).map(|df| df.height())
    }
}

/// Relation store keeping one Parquet file per relation under
/// `<root>/<database>/`.
#[derive(Debug, Clone)]
pub struct ParquetTableStore {
    connection: ConnectionConfig,
    dir: PathBuf,
}

impl ParquetTableStore {
    pub fn new(root: &Path, connection: ConnectionConfig) -> Self {
        let dir = root.join(&connection.database);
        Self { connection, dir }
    }

    pub fn relation_path(&self, relation: &str) -> PathBuf {
        self.dir.join(format!("{relation}.parquet"))
    }

    fn connectivity(&self, source: IngestError) -> StoreError {
        StoreError::connectivity(self.describe(), source)
    }
}

impl TableStore for ParquetTableStore {
    fn describe(&self) -> String {
        format!("{} ({})", self.connection.redacted_url(), self.dir.display())
    }

    fn replace(&self, relation: &str, batch: &DataFrame) -> Result<()> {
        let path = self.relation_path(relation);
        debug!(relation, path = %path.display(), "replacing relation");
        write_parquet_atomic(batch, &path).map_err(|err| self.connectivity(err))?;
        info!(relation, rows = batch.height(), "relation replaced");
        Ok(())
    }

    fn read(&self, relation: &str) -> Result<DataFrame> {
        let path = self.relation_path(relation);
        match read_parquet(&path) {
            Ok(df) => {
                debug!(relation, rows = df.height(), "relation read");
                Ok(df)
            }
            Err(IngestError::FileNotFound { path }) => Err(StoreError::RelationNotFound {
                relation: relation.to_string(),
                location: path.display().to_string(),
            }),
            Err(err) => Err(self.connectivity(err)),
        }
    }
}
