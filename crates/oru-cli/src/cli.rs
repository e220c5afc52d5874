//! CLI argument definitions for the ORU lab result processor.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use oru_cli::config::TABLE_ENV;

#[derive(Parser)]
#[command(
    name = "oru-processor",
    version,
    about = "Decode HL7 v2 ORU^R01 lab result messages into keyed result records",
    long_about = "Decode HL7 v2 observation-result (ORU^R01) messages into one record per \
                  observation, keyed by patient and by order/test/observation time.\n\n\
                  Records are written as JSON lines, one file per results table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// -v/-vv for debug/trace, -q for errors only.
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(flatten)]
    pub color: Color,

    #[command(flatten)]
    pub log: LogArgs,

    /// TOML settings file (table, source_root, output_dir).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode local message files and print the results.
    Decode(DecodeArgs),

    /// Process an object-created notification: fetch, decode and store.
    ProcessEvent(ProcessEventArgs),
}

#[derive(Args)]
pub struct DecodeArgs {
    /// HL7 message files.
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Print results as JSON lines instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ProcessEventArgs {
    /// Notification JSON file.
    #[arg(value_name = "EVENT")]
    pub event: PathBuf,

    /// Directory holding one sub-directory per bucket.
    #[arg(long = "source-root", value_name = "DIR")]
    pub source_root: Option<PathBuf>,

    /// Directory receiving `<table>.jsonl`.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Results table name.
    #[arg(long = "table", env = TABLE_ENV)]
    pub table: Option<String>,
}

/// Logging flags shared by every subcommand.
#[derive(Args)]
pub struct LogArgs {
    /// Level for this tool's own events; wins over -v/-q and `RUST_LOG`.
    #[arg(long = "log-level", value_enum, global = true)]
    pub level: Option<LogLevelArg>,

    #[arg(long = "log-format", value_enum, default_value_t = LogFormatArg::Pretty, global = true)]
    pub format: LogFormatArg,

    /// Append logs to PATH rather than stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub file: Option<PathBuf>,

    /// Prefix pretty and compact log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub timestamps: bool,

    /// Log patient identifiers instead of redacting them.
    #[arg(long = "log-data", global = true)]
    pub data: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    /// Multi-field text for terminals.
    Pretty,
    /// One short line per event.
    Compact,
    /// One JSON object per event.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_timestamps_flag() {
        let cli = Cli::try_parse_from(["oru-processor", "decode", "f.hl7"]).unwrap();
        assert!(!cli.log.timestamps);

        let cli =
            Cli::try_parse_from(["oru-processor", "decode", "--log-timestamps", "f.hl7"]).unwrap();
        assert!(cli.log.timestamps);
    }
}
