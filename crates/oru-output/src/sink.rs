//! Key-value sinks for assembled lab results.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use oru_model::{LabResult, StoreItem};
use serde::Serialize;
use tracing::trace;

use crate::error::{Result, SinkError};

/// Destination for stored results.
///
/// `put` is called once per result. Upsert, overwrite and duplicate handling
/// belong to the implementation; callers never deduplicate.
pub trait ResultSink {
    /// Writes one item addressed by its partition and sort key.
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] when the item cannot be written.
    fn put(&mut self, item: &StoreItem) -> Result<()>;

    /// Flushes any buffered items.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Converts and writes every result in order, returning the count.
    fn put_all(&mut self, results: &[LabResult]) -> Result<usize> {
        for result in results {
            self.put(&StoreItem::from(result))?;
        }
        Ok(results.len())
    }
}

#[derive(Serialize)]
struct Line<'a> {
    table: &'a str,
    item: &'a StoreItem,
}

/// Writes one JSON object per line: `{"table": ..., "item": {...}}`.
///
/// Lines are append-only; a later line for the same key supersedes an earlier
/// one when the file is loaded into a store.
pub struct JsonLinesSink<W: Write> {
    table: String,
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(table: impl Into<String>, writer: W) -> Self {
        Self {
            table: table.into(),
            writer,
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesSink<BufWriter<File>> {
    /// Opens `<dir>/<table>.jsonl` for appending, creating the directory.
    pub fn open(dir: &Path, table: &str) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|source| SinkError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = table_path(dir, table);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Io { path, source })?;
        Ok(Self::new(table, BufWriter::new(file)))
    }
}

/// Path of the JSON lines file backing a table.
pub fn table_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.jsonl"))
}

impl<W: Write> ResultSink for JsonLinesSink<W> {
    fn put(&mut self, item: &StoreItem) -> Result<()> {
        let line = Line {
            table: &self.table,
            item,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n").map_err(SinkError::Write)?;
        self.written += 1;
        trace!(
            table = %self.table,
            result_key = %item.sort_key(),
            "stored item"
        );
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(SinkError::Write)
    }
}

/// Sink that keeps every item in memory, in put order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub items: Vec<StoreItem>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items whose partition key matches.
    pub fn for_patient<'a>(&'a self, patient_pk: &'a str) -> impl Iterator<Item = &'a StoreItem> {
        self.items
            .iter()
            .filter(move |item| item.partition_key() == patient_pk)
    }
}

impl ResultSink for MemorySink {
    fn put(&mut self, item: &StoreItem) -> Result<()> {
        self.items.push(item.clone());
        Ok(())
    }
}
