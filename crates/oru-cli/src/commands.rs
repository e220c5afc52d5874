use std::fs;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use oru_cli::config::{Overrides, Settings, load_settings};
use oru_cli::event::StorageEvent;
use oru_cli::pipeline::handle_event;
use oru_ingest::{DirectorySource, decode_text};
use oru_output::{JsonLinesSink, ResultSink, table_path};
use oru_transform::Decoder;

use crate::cli::{DecodeArgs, ProcessEventArgs};
use crate::types::{DecodeResult, EventResult, FileDecode};

pub fn load_config_file(path: Option<&std::path::Path>) -> Result<Settings> {
    match path {
        Some(path) => Ok(load_settings(path)?),
        None => Ok(Settings::default()),
    }
}

pub fn run_decode(args: &DecodeArgs) -> Result<DecodeResult> {
    let decoder = Decoder::new();
    let mut files = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let span = info_span!("file", path = %path.display());
        let _guard = span.enter();
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let outcome = decoder
            .decode(&decode_text(&bytes))
            .map_err(|error| error.to_string());
        match &outcome {
            Ok(decoded) => info!(results = decoded.results.len(), "decoded file"),
            Err(error) => warn!(%error, "file not decoded"),
        }
        files.push(FileDecode {
            path: path.clone(),
            outcome,
        });
    }
    let has_errors = files.iter().any(|file| file.outcome.is_err());
    Ok(DecodeResult { files, has_errors })
}

pub fn run_process_event(args: &ProcessEventArgs, settings: Settings) -> Result<EventResult> {
    let config = settings.resolve(Overrides {
        table: args.table.clone(),
        source_root: args.source_root.clone(),
        output_dir: args.output_dir.clone(),
    });
    let json = fs::read_to_string(&args.event)
        .with_context(|| format!("read event {}", args.event.display()))?;
    let event = StorageEvent::from_json(&json)
        .with_context(|| format!("parse event {}", args.event.display()))?;
    info!(
        table = %config.table,
        records = event.records.len(),
        "handling event"
    );

    let source = DirectorySource::new(&config.source_root);
    let decoder = Decoder::new();
    let mut sink = JsonLinesSink::open(&config.output_dir, &config.table)
        .with_context(|| format!("open table {}", config.table))?;
    let reports = handle_event(&event, &source, &decoder, &mut sink);
    sink.flush().context("flush results")?;

    let has_errors = reports.iter().any(|report| !report.is_ok());
    Ok(EventResult {
        output_file: table_path(&config.output_dir, &config.table),
        table: config.table,
        reports,
        has_errors,
    })
}
