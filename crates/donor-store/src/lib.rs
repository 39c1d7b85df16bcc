//! Persistence and configuration for the donor pipeline.
//!
//! - **config**: connection, warehouse, path and gate settings resolved once
//!   from the environment
//! - **store**: named relations with replace-only semantics
//! - **postgres**: the same relations as PostgreSQL tables
//! - **warehouse**: export of the clean relation to an analytics target

mod config;
mod error;
mod postgres;
mod store;
mod warehouse;

pub use config::{
    ConnectionConfig, PipelinePaths, PipelineSettings, StoreBackend, WarehouseConfig, env_keys,
};
pub use error::{Result, StoreError};
pub use postgres::PostgresTableStore;
pub use store::{ParquetTableStore, TableStore};
pub use warehouse::{DirectoryWarehouse, ExportInfo, WarehouseExporter};
