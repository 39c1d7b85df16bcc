//! Pipeline stages and the orchestrator that chains them.
//!
//! Stages, in run order:
//! 1. **Ingest**: read the source batch, standardize, write the snapshot
//! 2. **Load raw**: replace the raw relation with the snapshot
//! 3. **Clean**: drop invalid rows, replace the clean relation, verify it
//! 4. **Check**: evaluate the quality gate on the stored clean relation
//! 5. **Export**: copy the clean relation to the warehouse (optional)
//!
//! Each stage is usable on its own; [`Pipeline::run`] chains 1 to 4.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use donor_ingest::{BatchSource, SnapshotInfo, read_snapshot, write_snapshot};
use donor_model::{CLEAN_RELATION, EXPORT_TABLE, RAW_RELATION};
use donor_store::{ExportInfo, PipelineSettings, TableStore, WarehouseExporter};
use donor_transform::{StandardizeReport, standardize_with_report};
use donor_validate::{BatchProfile, DropReport, QualityGate, QualityReport, clean, profile_batch};
use tracing::{info, info_span, warn};

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Result of the ingest stage.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub snapshot: SnapshotInfo,
    pub standardize: StandardizeReport,
}

/// Read, standardize and snapshot the source batch.
///
/// A schema error aborts before the snapshot is touched.
pub fn ingest(source: &dyn BatchSource, snapshot_path: &Path) -> Result<IngestOutcome> {
    let span = info_span!("ingest", source = %source.describe());
    let _guard = span.enter();
    let start = Instant::now();

    let raw = source
        .read_batch()
        .with_context(|| format!("read source {}", source.describe()))?;
    let (standardized, report) = standardize_with_report(&raw).context("standardize batch")?;
    if report.total_invalid_dates() > 0 {
        warn!(
            invalid_dates = report.total_invalid_dates(),
            "unparseable dates replaced by null"
        );
    }
    let snapshot = write_snapshot(&standardized, snapshot_path)
        .with_context(|| format!("write snapshot {}", snapshot_path.display()))?;

    info!(
        rows = snapshot.rows,
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(IngestOutcome {
        snapshot,
        standardize: report,
    })
}

// ============================================================================
// Stage 2: Load raw
// ============================================================================

/// Replace the raw relation with the snapshot. Returns the loaded row count.
pub fn load_raw(snapshot_path: &Path, store: &dyn TableStore) -> Result<usize> {
    let span = info_span!("load_raw", relation = RAW_RELATION);
    let _guard = span.enter();
    let start = Instant::now();

    let batch = read_snapshot(snapshot_path)
        .with_context(|| format!("read snapshot {}", snapshot_path.display()))?;
    store
        .replace(RAW_RELATION, &batch)
        .with_context(|| format!("replace {RAW_RELATION} in {}", store.describe()))?;

    info!(
        rows = batch.height(),
        duration_ms = start.elapsed().as_millis(),
        "raw relation loaded"
    );
    Ok(batch.height())
}

// ============================================================================
// Stage 3: Clean
// ============================================================================

/// Result of the clean stage.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub drops: DropReport,
    /// Row count read back from the store after the write.
    pub stored_rows: usize,
}

/// Clean the raw relation into the clean relation.
pub fn clean_relation(store: &dyn TableStore) -> Result<CleanOutcome> {
    let span = info_span!("clean", relation = CLEAN_RELATION);
    let _guard = span.enter();
    let start = Instant::now();

    let raw = store
        .read(RAW_RELATION)
        .with_context(|| format!("read {RAW_RELATION}"))?;
    let (kept, drops) = clean(&raw).context("clean batch")?;
    store
        .replace(CLEAN_RELATION, &kept)
        .with_context(|| format!("replace {CLEAN_RELATION} in {}", store.describe()))?;

    let stored_rows = store
        .row_count(CLEAN_RELATION)
        .with_context(|| format!("count {CLEAN_RELATION}"))?;
    if stored_rows != drops.kept_rows {
        bail!(
            "{CLEAN_RELATION} holds {stored_rows} rows after write, expected {}",
            drops.kept_rows
        );
    }

    info!(
        input_rows = drops.input_rows,
        dropped = drops.total_dropped(),
        kept_rows = drops.kept_rows,
        duration_ms = start.elapsed().as_millis(),
        "clean complete"
    );
    Ok(CleanOutcome { drops, stored_rows })
}

// ============================================================================
// Stage 4: Check
// ============================================================================

/// Evaluate the quality gate against the stored clean relation.
///
/// A FAIL verdict is a normal return value.
pub fn check(store: &dyn TableStore, gate: &QualityGate) -> Result<QualityReport> {
    let span = info_span!("check", relation = CLEAN_RELATION);
    let _guard = span.enter();

    let batch = store
        .read(CLEAN_RELATION)
        .with_context(|| format!("read {CLEAN_RELATION}"))?;
    let report = gate.evaluate(&batch);
    if !report.passed() {
        for reason in report.reasons() {
            warn!(%reason, "quality check failed");
        }
    }
    Ok(report)
}

// ============================================================================
// Stage 5: Export
// ============================================================================

/// Replace the warehouse table with the clean relation.
pub fn export(store: &dyn TableStore, exporter: &dyn WarehouseExporter) -> Result<ExportInfo> {
    let span = info_span!("export", table = EXPORT_TABLE);
    let _guard = span.enter();
    let start = Instant::now();

    let batch = store
        .read(CLEAN_RELATION)
        .with_context(|| format!("read {CLEAN_RELATION}"))?;
    let exported = exporter
        .export(EXPORT_TABLE, &batch)
        .context("export clean relation")?;

    info!(
        destination = %exported.destination,
        rows = exported.rows,
        duration_ms = start.elapsed().as_millis(),
        "export complete"
    );
    Ok(exported)
}

// ============================================================================
// Inspect
// ============================================================================

/// Profile of a source batch, computed without writing anything.
#[derive(Debug, Clone)]
pub struct InspectOutcome {
    pub raw: BatchProfile,
    pub standardized: BatchProfile,
    pub standardize: StandardizeReport,
}

pub fn inspect(source: &dyn BatchSource) -> Result<InspectOutcome> {
    let span = info_span!("inspect", source = %source.describe());
    let _guard = span.enter();

    let raw = source
        .read_batch()
        .with_context(|| format!("read source {}", source.describe()))?;
    let (standardized, report) = standardize_with_report(&raw).context("standardize batch")?;
    Ok(InspectOutcome {
        raw: profile_batch(&raw),
        standardized: profile_batch(&standardized),
        standardize: report,
    })
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Everything one end-to-end run produced.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub ingest: IngestOutcome,
    pub raw_rows: usize,
    pub clean: CleanOutcome,
    pub quality: QualityReport,
}

impl RunResult {
    pub fn passed(&self) -> bool {
        self.quality.passed()
    }
}

/// Chains ingest, load, clean and check against one store.
///
/// A FAIL verdict does not roll back the clean relation. Any error aborts
/// the run at the stage that raised it.
pub struct Pipeline<'a> {
    settings: &'a PipelineSettings,
    store: &'a dyn TableStore,
}

impl<'a> Pipeline<'a> {
    pub fn new(settings: &'a PipelineSettings, store: &'a dyn TableStore) -> Self {
        Self { settings, store }
    }

    pub fn run(&self, source: &dyn BatchSource) -> Result<RunResult> {
        let span = info_span!("run", store = %self.store.describe());
        let _guard = span.enter();
        let start = Instant::now();

        let ingest = ingest(source, &self.settings.paths.snapshot)?;
        let raw_rows = load_raw(&self.settings.paths.snapshot, self.store)?;
        let clean = clean_relation(self.store)?;
        let quality = check(self.store, &QualityGate::new(self.settings.gate))?;

        info!(
            verdict = quality.verdict.label(),
            duration_ms = start.elapsed().as_millis(),
            "pipeline run complete"
        );
        Ok(RunResult {
            ingest,
            raw_rows,
            clean,
            quality,
        })
    }
}
