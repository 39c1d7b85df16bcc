//! CLI argument definitions for the donor pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "donor-pipeline",
    version,
    about = "Blood-donation data pipeline - ingest, clean, check and export donor records",
    long_about = "Blood-donation data pipeline.\n\n\
                  Reads the donor CSV, standardizes it, stores raw and clean relations,\n\
                  gates the clean relation on volume, completeness and blood-group\n\
                  validity, and exports it to the analytics warehouse.\n\n\
                  Settings come from the environment (a .env file is loaded first)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix each log line with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the module path of each log event.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,

    /// Do not emit span close events in JSON logs.
    #[arg(long = "no-log-spans", global = true)]
    pub no_log_spans: bool,

    /// Data directory root (overrides DON_SANG_DATA_DIR).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Relation store backend (overrides DON_SANG_STORE).
    #[arg(long = "store", value_enum, global = true)]
    pub store: Option<StoreArg>,

    /// Minimum clean row count for a PASS (overrides DON_SANG_MIN_ROWS).
    #[arg(long = "min-rows", value_name = "N", global = true)]
    pub min_rows: Option<usize>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run ingest, load-raw, clean and check in one process.
    Run(RunArgs),

    /// Read the source CSV, standardize it and write the raw snapshot.
    Ingest(SourceArgs),

    /// Replace the raw relation with the snapshot.
    LoadRaw,

    /// Clean the raw relation into the clean relation.
    Clean,

    /// Evaluate the quality gate on the clean relation (exit 1 on FAIL).
    Check(CheckArgs),

    /// Export the clean relation to the warehouse (requires GCP_PROJECT_ID).
    Export,

    /// Profile a CSV file without writing anything.
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct SourceArgs {
    /// Source CSV (default: <DATA_DIR>/raw/dataset_don_sang.csv).
    #[arg(long = "source", value_name = "CSV")]
    pub source: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Export the clean relation after a PASS.
    #[arg(long = "export")]
    pub export: bool,

    /// Also write the quality report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Also write the quality report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// CSV file to profile.
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// CLI relation store choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum StoreArg {
    /// Parquet files under <DATA_DIR>/store.
    Parquet,
    /// PostgreSQL tables (PG_HOST, PG_PORT, PG_USER, PG_PASSWORD, PG_DB).
    Postgres,
}
