//! Tracing setup for the processor.
//!
//! Events from the workspace crates are shown at the configured level and
//! everything else at `warn`. `RUST_LOG` replaces that directive unless an
//! explicit level was requested on the command line.
//!
//! | Level   | Used for                                         |
//! |---------|--------------------------------------------------|
//! | `error` | objects that failed to fetch, decode or store    |
//! | `warn`  | timestamp fallbacks, lossy text decoding         |
//! | `info`  | one line per processed object, result counts     |
//! | `debug` | per-message and per-result detail                |
//! | `trace` | tokenizer and sink internals                     |
//!
//! Patient identifiers go through [`redact_value`] and appear only when PHI
//! logging was switched on with `--log-data`.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

static PHI_LOGGING: AtomicBool = AtomicBool::new(false);

/// Stand-in for patient data when PHI logging is off.
pub const REDACTED_VALUE: &str = "[REDACTED]";

const OWN_CRATES: [&str; 6] = [
    "oru_cli",
    "oru_ingest",
    "oru_model",
    "oru_output",
    "oru_processor",
    "oru_transform",
];

pub fn phi_logging_enabled() -> bool {
    PHI_LOGGING.load(Ordering::Relaxed)
}

/// Passes `value` through only when PHI logging is on.
pub fn redact_value(value: &str) -> &str {
    if phi_logging_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-field human format.
    #[default]
    Pretty,
    Compact,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    /// Let `RUST_LOG` replace the computed directive.
    pub honor_rust_log: bool,
    pub format: LogFormat,
    pub ansi: bool,
    /// Prefix pretty and compact lines with a timestamp. JSON lines always
    /// carry one.
    pub timestamps: bool,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
    pub log_data: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            honor_rust_log: true,
            format: LogFormat::default(),
            ansi: true,
            timestamps: false,
            file: None,
            log_data: false,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// `warn` for dependencies, the configured level for workspace crates.
    pub fn directive(&self) -> String {
        let level = self.level.to_string().to_lowercase();
        std::iter::once("warn".to_string())
            .chain(OWN_CRATES.iter().map(|krate| format!("{krate}={level}")))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn filter(&self) -> EnvFilter {
        self.honor_rust_log
            .then(EnvFilter::try_from_default_env)
            .and_then(Result::ok)
            .unwrap_or_else(|| EnvFilter::new(self.directive()))
    }
}

/// Installs the global subscriber. Call once, at startup.
///
/// # Errors
///
/// Fails when the log file cannot be opened or a global subscriber is
/// already installed.
pub fn init_logging(config: &LogConfig) -> io::Result<()> {
    let writer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(io::stderr),
    };
    PHI_LOGGING.store(config.log_data, Ordering::Release);
    subscriber(config, writer)
        .try_init()
        .map_err(io::Error::other)
}

/// Builds the subscriber without installing it.
pub fn subscriber(config: &LogConfig, writer: BoxMakeWriter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry()
        .with(config.filter())
        .with(format_layer(config, writer))
}

fn format_layer<S>(config: &LogConfig, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_ansi(config.ansi && config.format != LogFormat::Json);
    match (config.format, config.timestamps) {
        (LogFormat::Json, _) => base.json().with_span_events(FmtSpan::CLOSE).boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Pretty, true) => base.boxed(),
        (LogFormat::Pretty, false) => base.without_time().boxed(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_directive_covers_workspace_crates() {
        let config = LogConfig::default().with_level(LevelFilter::DEBUG);
        assert_eq!(
            config.directive(),
            "warn,oru_cli=debug,oru_ingest=debug,oru_model=debug,oru_output=debug,\
             oru_processor=debug,oru_transform=debug"
        );
    }

    #[test]
    fn test_redaction_is_default() {
        assert!(!LogConfig::default().log_data);
        assert_eq!(redact_value("MRN-1"), REDACTED_VALUE);
    }

    fn first_line(config: &LogConfig) -> String {
        let capture = Capture::default();
        let sink = capture.clone();
        let subscriber = subscriber(config, BoxMakeWriter::new(move || sink.clone()));
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "oru_transform::assemble", "using processing time");
        });
        capture.text().lines().next().unwrap_or_default().to_string()
    }

    #[test]
    fn test_timestamps_prefix_text_lines() {
        for format in [LogFormat::Pretty, LogFormat::Compact] {
            let plain = LogConfig {
                honor_rust_log: false,
                ansi: false,
                format,
                ..LogConfig::default()
            };
            let stamped = LogConfig {
                timestamps: true,
                ..plain.clone()
            };

            let line = first_line(&plain);
            assert!(line.contains("using processing time"), "{line}");
            assert!(!line.starts_with(|c: char| c.is_ascii_digit()), "{line}");

            let line = first_line(&stamped);
            assert!(line.contains("using processing time"), "{line}");
            assert!(line.starts_with(|c: char| c.is_ascii_digit()), "{line}");
        }
    }

    #[test]
    fn test_json_output_keeps_workspace_events_only() {
        let capture = Capture::default();
        let sink = capture.clone();
        let config = LogConfig {
            honor_rust_log: false,
            format: LogFormat::Json,
            ..LogConfig::default()
        };
        let subscriber = subscriber(&config, BoxMakeWriter::new(move || sink.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "oru_ingest::source", bytes = 42, "fetched object");
            tracing::info!(target: "hyper::client", "connection reused");
        });

        let text = capture.text();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["fields"]["message"], "fetched object");
        assert_eq!(lines[0]["fields"]["bytes"], 42);
    }
}
