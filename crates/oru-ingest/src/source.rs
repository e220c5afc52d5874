//! Fetching raw message bytes from an object store.
//!
//! The decoder itself never performs I/O. Callers fetch bytes through an
//! [`ObjectSource`], turn them into text with [`decode_text`] and hand the
//! text to the decoder.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use encoding_rs::UTF_8;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SourceError};

/// Address of one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocator {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocator {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Builds a locator from a key as it appears in a storage notification,
    /// where it is form-URL-encoded.
    pub fn from_event_key(bucket: impl Into<String>, encoded_key: &str) -> Self {
        Self::new(bucket, decode_object_key(encoded_key))
    }
}

impl fmt::Display for ObjectLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Anything that can return the raw bytes of an object.
pub trait ObjectSource {
    /// Fetches the full object body.
    ///
    /// # Errors
    ///
    /// Returns a [`SourceError`] when the object is missing or unreadable.
    fn fetch(&self, locator: &ObjectLocator) -> Result<Vec<u8>>;
}

/// Object source backed by a local directory: each bucket is a sub-directory
/// of `root` and each key a relative path inside it.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves a locator to a path, refusing anything that would leave the
    /// bucket directory.
    pub fn resolve(&self, locator: &ObjectLocator) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for (part, label) in [(&locator.bucket, "bucket"), (&locator.key, "key")] {
            let relative = Path::new(part.as_str());
            if part.is_empty() {
                return Err(SourceError::InvalidKey {
                    key: locator.to_string(),
                    reason: format!("{label} is empty"),
                });
            }
            if !relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)))
            {
                return Err(SourceError::InvalidKey {
                    key: locator.to_string(),
                    reason: format!("{label} must be a relative path without '..'"),
                });
            }
            path.push(relative);
        }
        Ok(path)
    }
}

impl ObjectSource for DirectorySource {
    fn fetch(&self, locator: &ObjectLocator) -> Result<Vec<u8>> {
        let path = self.resolve(locator)?;
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(object = %locator, bytes = bytes.len(), "fetched object");
                Ok(bytes)
            }
            Err(source) if source.kind() == ErrorKind::NotFound => Err(SourceError::NotFound {
                bucket: locator.bucket.clone(),
                key: locator.key.clone(),
            }),
            Err(source) => Err(SourceError::Read { path, source }),
        }
    }
}

/// Decodes object bytes as UTF-8 text.
///
/// A byte order mark is honoured and stripped. Malformed sequences are
/// replaced with U+FFFD and a warning is logged instead of failing.
pub fn decode_text(bytes: &[u8]) -> String {
    let (text, encoding, had_errors) = UTF_8.decode(bytes);
    if had_errors {
        warn!(
            encoding = encoding.name(),
            "message contained malformed byte sequences; replaced"
        );
    }
    text.into_owned()
}

/// Decodes a form-URL-encoded object key: `+` is a space and `%XX` a byte.
pub fn decode_object_key(encoded: &str) -> String {
    let spaced = encoded.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
