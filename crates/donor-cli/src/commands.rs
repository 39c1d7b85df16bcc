//! Command handlers.
//!
//! Each handler resolves paths and backends from the settings, runs one
//! pipeline stage and returns its outcome for printing.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use donor_ingest::CsvSource;
use donor_store::{
    DirectoryWarehouse, ExportInfo, ParquetTableStore, PipelinePaths, PipelineSettings,
    PostgresTableStore, StoreBackend, TableStore,
};
use donor_validate::{QualityGate, QualityReport};
use tracing::{debug, info};

use donor_cli::pipeline::{
    CleanOutcome, IngestOutcome, InspectOutcome, Pipeline, RunResult, check, clean_relation,
    export, ingest, inspect, load_raw,
};

use crate::cli::{CheckArgs, Cli, InspectArgs, RunArgs, SourceArgs, StoreArg};

/// Resolve settings from the environment, then apply CLI overrides.
pub fn resolve_settings(cli: &Cli) -> Result<PipelineSettings> {
    let mut settings = PipelineSettings::from_env().context("resolve configuration")?;
    if let Some(dir) = &cli.data_dir {
        settings.paths = PipelinePaths::new(dir);
    }
    if let Some(min_rows) = cli.min_rows {
        settings.gate.min_rows = min_rows;
    }
    if let Some(store) = cli.store {
        settings.backend = match store {
            StoreArg::Parquet => StoreBackend::Parquet,
            StoreArg::Postgres => StoreBackend::Postgres,
        };
    }
    debug!(
        backend = ?settings.backend,
        store = %settings.connection.redacted_url(),
        data_dir = %settings.paths.data_dir().display(),
        min_rows = settings.gate.min_rows,
        "configuration resolved"
    );
    Ok(settings)
}

fn open_store(settings: &PipelineSettings) -> Result<Box<dyn TableStore>> {
    let store: Box<dyn TableStore> = match settings.backend {
        StoreBackend::Parquet => Box::new(ParquetTableStore::new(
            &settings.paths.store_root,
            settings.connection.clone(),
        )),
        StoreBackend::Postgres => Box::new(
            PostgresTableStore::open(settings.connection.clone())
                .context("open postgres store")?,
        ),
    };
    debug!(store = %store.describe(), "relation store opened");
    Ok(store)
}

fn open_warehouse(settings: &PipelineSettings) -> Result<DirectoryWarehouse> {
    DirectoryWarehouse::new(&settings.paths.warehouse_root, settings.warehouse.clone())
        .context("configure warehouse export")
}

fn source_path(settings: &PipelineSettings, args: &SourceArgs) -> PathBuf {
    args.source
        .clone()
        .unwrap_or_else(|| settings.paths.source_csv.clone())
}

/// Result of `run`, with the optional export.
pub struct RunOutcome {
    pub result: RunResult,
    pub export: Option<ExportInfo>,
}

pub fn run_pipeline(settings: &PipelineSettings, args: &RunArgs) -> Result<RunOutcome> {
    // Fail on a missing project id before any stage writes.
    let warehouse = if args.export {
        Some(open_warehouse(settings)?)
    } else {
        None
    };
    let store = open_store(settings)?;
    let source = CsvSource::new(source_path(settings, &args.source));

    let result = Pipeline::new(settings, store.as_ref()).run(&source)?;
    if let Some(path) = &args.report_json {
        write_report_json(path, &result.quality)?;
    }

    let export = match warehouse {
        Some(warehouse) if result.passed() => Some(export(store.as_ref(), &warehouse)?),
        Some(_) => {
            info!("quality gate failed; export skipped");
            None
        }
        None => None,
    };
    Ok(RunOutcome { result, export })
}

pub fn run_ingest(settings: &PipelineSettings, args: &SourceArgs) -> Result<IngestOutcome> {
    let source = CsvSource::new(source_path(settings, args));
    ingest(&source, &settings.paths.snapshot)
}

pub fn run_load_raw(settings: &PipelineSettings) -> Result<usize> {
    load_raw(&settings.paths.snapshot, open_store(settings)?.as_ref())
}

pub fn run_clean(settings: &PipelineSettings) -> Result<CleanOutcome> {
    clean_relation(open_store(settings)?.as_ref())
}

pub fn run_check(settings: &PipelineSettings, args: &CheckArgs) -> Result<QualityReport> {
    let report = check(
        open_store(settings)?.as_ref(),
        &QualityGate::new(settings.gate),
    )?;
    if let Some(path) = &args.report_json {
        write_report_json(path, &report)?;
    }
    Ok(report)
}

pub fn run_export(settings: &PipelineSettings) -> Result<ExportInfo> {
    let warehouse = open_warehouse(settings)?;
    export(open_store(settings)?.as_ref(), &warehouse)
}

pub fn run_inspect(args: &InspectArgs) -> Result<InspectOutcome> {
    inspect(&CsvSource::new(&args.csv))
}

fn write_report_json(path: &Path, report: &QualityReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .with_context(|| format!("write {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", path.display()))?;
    info!(path = %path.display(), "quality report written");
    Ok(())
}
