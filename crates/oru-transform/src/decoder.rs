//! End-to-end decoding: text to tokens to groups to results.

use oru_ingest::{navigate, tokenize};
use oru_model::{LabResult, MessageHeader, Result};
use tracing::debug;

use crate::assemble::assemble;
use crate::datetime::{Clock, SystemClock};

/// Results of one message plus its header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub header: MessageHeader,
    pub results: Vec<LabResult>,
}

/// Stateless ORU^R01 decoder.
///
/// Holds no per-message state, so one decoder can serve any number of
/// messages, from any number of threads. The clock is read once per message;
/// every timestamp fallback in a message gets the same processing time.
#[derive(Debug, Clone, Default)]
pub struct Decoder<C = SystemClock> {
    clock: C,
}

impl Decoder<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> Decoder<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Decodes one message into results in segment order.
    ///
    /// # Errors
    ///
    /// Any structural [`DecodeError`](oru_model::DecodeError) aborts the whole
    /// message; no partial results are returned.
    pub fn decode(&self, text: &str) -> Result<DecodedMessage> {
        let tree = navigate(tokenize(text)?)?;
        let processing_time = self.clock.now();
        let results = assemble(&tree, processing_time);
        debug!(
            control_id = %tree.header.control_id,
            result_count = results.len(),
            "decoded message"
        );
        Ok(DecodedMessage {
            header: tree.header,
            results,
        })
    }
}

/// Decodes one message with the given clock.
///
/// # Errors
///
/// See [`Decoder::decode`].
pub fn decode_message<C: Clock>(text: &str, clock: C) -> Result<Vec<LabResult>> {
    Decoder::with_clock(clock)
        .decode(text)
        .map(|decoded| decoded.results)
}
