//! Lab result assembly for HL7 v2 ORU^R01 messages.
//!
//! This crate turns a navigated message into flat [`LabResult`](oru_model::LabResult)
//! records:
//!
//! - [`extract`]: never-failing field extractors
//! - [`datetime`]: OBX-14 normalization with the processing-time fallback
//! - [`assemble`]: depth-first flattening, one record per observation
//! - [`decoder`]: tokenize, navigate and assemble in one call

pub mod assemble;
pub mod datetime;
pub mod decoder;
pub mod extract;

pub use assemble::assemble;
pub use datetime::{
    Clock, FixedClock, ObservationTime, SystemClock, normalize_observation_time,
    parse_observation_time,
};
pub use decoder::{DecodedMessage, Decoder, decode_message};
pub use extract::{ObservationFields, PatientFields, order_id, result_value};
