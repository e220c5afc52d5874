//! Result sinks.
//!
//! Every assembled result is written as a [`StoreItem`](oru_model::StoreItem)
//! addressed by (`PatientId`, `ResultKey`):
//!
//! - **JSON lines**: one `{"table", "item"}` object per line
//! - **Memory**: items kept in a `Vec`, for tests and dry runs

mod error;
mod sink;

pub use error::{Result, SinkError};
pub use sink::{JsonLinesSink, MemorySink, ResultSink, table_path};
