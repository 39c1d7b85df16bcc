//! Export of the clean relation to the analytics warehouse.

use std::path::{Path, PathBuf};

use donor_ingest::write_parquet_atomic;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::config::WarehouseConfig;
use crate::error::{Result, StoreError};

/// Where and how much was exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportInfo {
    pub destination: String,
    pub rows: usize,
}

/// Replace-only export target.
pub trait WarehouseExporter {
    fn export(&self, table: &str, batch: &DataFrame) -> Result<ExportInfo>;
}

/// Warehouse backed by a directory tree:
/// `<root>/<project>/<dataset>/<table>.parquet`.
#[derive(Debug, Clone)]
pub struct DirectoryWarehouse {
    root: PathBuf,
    config: WarehouseConfig,
}

impl DirectoryWarehouse {
    /// Fails when the project id is unset, before touching the filesystem.
    pub fn new(root: &Path, config: WarehouseConfig) -> Result<Self> {
        config.require_project()?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn table_path(&self, table: &str) -> Result<PathBuf> {
        Ok(self
            .root
            .join(self.config.require_project()?)
            .join(&self.config.dataset_id)
            .join(format!("{table}.parquet")))
    }
}

impl WarehouseExporter for DirectoryWarehouse {
    fn export(&self, table: &str, batch: &DataFrame) -> Result<ExportInfo> {
        let destination = self.config.destination(table)?;
        let path = self.table_path(table)?;
        write_parquet_atomic(batch, &path)
            .map_err(|source| StoreError::connectivity(destination.clone(), source))?;
        info!(%destination, rows = batch.height(), "table exported");
        Ok(ExportInfo {
            destination,
            rows: batch.height(),
        })
    }
}
