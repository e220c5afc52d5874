//! Fetch, decode and store stages for one object or one notification.

use std::time::Instant;

use anyhow::{Context, Result};
use oru_ingest::{ObjectLocator, ObjectSource, decode_text};
use oru_model::StoreItem;
use oru_output::ResultSink;
use oru_transform::{Clock, Decoder};
use tracing::{debug, error, info, info_span};

use crate::event::StorageEvent;
use crate::logging::redact_value;

/// Outcome of one successfully processed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectOutcome {
    pub locator: ObjectLocator,
    pub control_id: String,
    pub bytes: usize,
    pub results: usize,
    pub fallback_times: usize,
}

/// Outcome of one object in a notification.
#[derive(Debug)]
pub struct ObjectReport {
    pub locator: ObjectLocator,
    pub outcome: Result<ObjectOutcome>,
}

impl ObjectReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Fetches one object, decodes it and writes every result to the sink.
///
/// Decoding is all-or-nothing: a structural error stores nothing for the
/// object.
pub fn process_object<S, K, C>(
    source: &S,
    decoder: &Decoder<C>,
    sink: &mut K,
    locator: &ObjectLocator,
) -> Result<ObjectOutcome>
where
    S: ObjectSource + ?Sized,
    K: ResultSink + ?Sized,
    C: Clock,
{
    let span = info_span!("object", object = %locator);
    let _guard = span.enter();
    let start = Instant::now();
    info!("processing object");

    let bytes = source
        .fetch(locator)
        .with_context(|| format!("fetch {locator}"))?;
    let text = decode_text(&bytes);
    info!(bytes = bytes.len(), "read object");

    let decoded = decoder
        .decode(&text)
        .with_context(|| format!("decode {locator}"))?;

    for result in &decoded.results {
        sink.put(&StoreItem::from(result))
            .with_context(|| format!("store result {}", result.result_key()))?;
        debug!(
            result_key = %result.result_key(),
            patient_id = %redact_value(result.patient_pk()),
            "saved result"
        );
    }
    sink.flush().context("flush sink")?;

    let fallback_times = decoded
        .results
        .iter()
        .filter(|result| result.observation_time_source.is_fallback())
        .count();
    info!(
        control_id = %decoded.header.control_id,
        results = decoded.results.len(),
        fallback_times,
        duration_ms = start.elapsed().as_millis(),
        "stored results"
    );

    Ok(ObjectOutcome {
        locator: locator.clone(),
        control_id: decoded.header.control_id,
        bytes: bytes.len(),
        results: decoded.results.len(),
        fallback_times,
    })
}

/// Processes every object named in a notification, in order.
///
/// A failing object is logged and reported; the remaining objects still run.
pub fn handle_event<S, K, C>(
    event: &StorageEvent,
    source: &S,
    decoder: &Decoder<C>,
    sink: &mut K,
) -> Vec<ObjectReport>
where
    S: ObjectSource + ?Sized,
    K: ResultSink + ?Sized,
    C: Clock,
{
    event
        .locators()
        .into_iter()
        .map(|locator| {
            let outcome = process_object(source, decoder, &mut *sink, &locator);
            if let Err(error) = &outcome {
                error!(object = %locator, error = %format!("{error:#}"), "object failed");
            }
            ObjectReport { locator, outcome }
        })
        .collect()
}
