//! Blood-donation pipeline CLI.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use donor_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    resolve_settings, run_check, run_clean, run_export, run_ingest, run_inspect, run_load_raw,
    run_pipeline,
};
use crate::summary::{
    print_clean, print_export, print_ingest, print_inspect, print_load_raw, print_quality,
    print_run_summary,
};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match dispatch(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Run the selected command. `Ok(false)` is a quality gate FAIL.
fn dispatch(cli: &Cli) -> Result<bool> {
    if let Command::Inspect(args) = &cli.command {
        print_inspect(&run_inspect(args)?);
        return Ok(true);
    }
    let settings = resolve_settings(cli)?;
    match &cli.command {
        Command::Run(args) => {
            let outcome = run_pipeline(&settings, args)?;
            print_run_summary(&outcome);
            Ok(outcome.result.passed())
        }
        Command::Ingest(args) => {
            print_ingest(&run_ingest(&settings, args)?);
            Ok(true)
        }
        Command::LoadRaw => {
            print_load_raw(run_load_raw(&settings)?);
            Ok(true)
        }
        Command::Clean => {
            print_clean(&run_clean(&settings)?);
            Ok(true)
        }
        Command::Check(args) => {
            let report = run_check(&settings, args)?;
            print_quality(&report);
            Ok(report.passed())
        }
        Command::Export => {
            print_export(&run_export(&settings)?);
            Ok(true)
        }
        Command::Inspect(_) => Ok(true),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.with_timestamps = cli.log_timestamps;
    config.with_target = cli.log_target;
    config.with_spans = !cli.no_log_spans;
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("donor-pipeline").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn log_layout_defaults() {
        let config = log_config_from_cli(&parse(&["check"]));
        assert!(!config.with_timestamps);
        assert!(!config.with_target);
        assert!(config.with_spans);
        assert!(config.use_env_filter);
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn log_layout_flags_reach_the_config() {
        let cli = parse(&[
            "--log-timestamps",
            "--log-target",
            "--no-log-spans",
            "--log-format",
            "json",
            "--color",
            "never",
            "check",
        ]);
        let config = log_config_from_cli(&cli);
        assert!(config.with_timestamps);
        assert!(config.with_target);
        assert!(!config.with_spans);
        assert!(!config.with_ansi);
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn store_flag_selects_the_backend() {
        let settings = resolve_settings(&parse(&["--store", "postgres", "check"])).unwrap();
        assert_eq!(settings.backend, donor_store::StoreBackend::Postgres);
        let settings = resolve_settings(&parse(&["--store", "parquet", "clean"])).unwrap();
        assert_eq!(settings.backend, donor_store::StoreBackend::Parquet);
    }

    #[test]
    fn explicit_level_disables_env_filter() {
        let config = log_config_from_cli(&parse(&["clean", "--log-level", "debug"]));
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
        assert!(!config.use_env_filter);
    }
}
