//! `oru-processor`: decode ORU^R01 lab result messages.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use oru_cli::logging::{LogConfig, LogFormat, init_logging};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{load_config_file, run_decode, run_process_event};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the selected command; `Ok(false)` means some input failed.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let settings = load_config_file(cli.config.as_deref())?;
    match &cli.command {
        Command::Decode(args) => {
            let result = run_decode(args)?;
            summary::print_decode(&result, args.json);
            Ok(!result.has_errors)
        }
        Command::ProcessEvent(args) => {
            let result = run_process_event(args, settings)?;
            summary::print_event(&result);
            Ok(!result.has_errors)
        }
    }
}

/// `--log-level` beats `-v`/`-q`; either one disables `RUST_LOG`.
fn log_config(cli: &Cli) -> LogConfig {
    let level = cli.log.level.map_or_else(
        || cli.verbosity.tracing_level_filter(),
        |level| match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        },
    );
    let format = match cli.log.format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    let ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log.file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level,
        honor_rust_log: !(cli.verbosity.is_present() || cli.log.level.is_some()),
        format,
        ansi,
        timestamps: cli.log.timestamps,
        file: cli.log.file.clone(),
        log_data: cli.log.data,
        ..LogConfig::default()
    }
}
