//! Data model for decoding HL7 v2 ORU^R01 observation-result messages.
//!
//! - [`segment`]: tokenized segments, fields, repetitions and components
//! - [`grammar`]: the structure table that drives group navigation
//! - [`tree`]: the navigated group hierarchy
//! - [`result`] and [`keys`]: flattened lab results and their storage keys
//! - [`item`]: the attribute map handed to the key-value store

pub mod error;
pub mod grammar;
pub mod item;
pub mod keys;
pub mod result;
pub mod segment;
pub mod tree;

pub use error::{DecodeError, Result};
pub use grammar::{FieldPath, GroupLevel, GroupRule, MessageGrammar, ORU_R01, fields};
pub use item::StoreItem;
pub use keys::{KEY_SEPARATOR, RecordKeys};
pub use result::{LabResult, TimestampSource};
pub use segment::{Component, Delimiters, Field, Repetition, Segment};
pub use tree::{Group, MessageHeader, MessageTree};
