//! HL7 v2 message ingestion.
//!
//! # Features
//!
//! - **Object fetch**: [`ObjectSource`] and the directory-backed [`DirectorySource`]
//! - **Text decoding**: UTF-8 with BOM handling via [`decode_text`]
//! - **Tokenizing**: raw text to typed segments with header-declared delimiters
//! - **Navigation**: segment stream to the patient / order / observation hierarchy
//!
//! # Example
//!
//! ```ignore
//! use oru_ingest::{navigate, tokenize};
//!
//! let tree = navigate(tokenize(text)?)?;
//! println!("{} observations", tree.observation_count());
//! ```

mod error;
pub mod navigator;
pub mod source;
pub mod tokenizer;

// === Error Types ===
pub use error::{Result, SourceError};

// === Object Fetch ===
pub use source::{DirectorySource, ObjectLocator, ObjectSource, decode_object_key, decode_text};

// === Structure ===
pub use navigator::{navigate, navigate_with};
pub use tokenizer::{TokenizedMessage, read_delimiters, tokenize, unescape};
