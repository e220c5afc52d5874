//! Structural errors raised while decoding a message.

use thiserror::Error;

/// Errors that abort decoding of a whole message.
///
/// Field-level absence is never reported here; extractors substitute empty
/// text instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Empty input, or the first segment is not the message header.
    #[error("malformed HL7 message: {reason}")]
    MalformedMessage { reason: String },

    /// The header declares a message type other than ORU^R01.
    #[error("unsupported HL7 message type: {declared}")]
    UnsupportedMessageType { declared: String },

    /// A segment appeared without the group that must enclose it.
    #[error("{segment} segment is missing its required {required} group")]
    MissingGroup {
        segment: String,
        required: &'static str,
    },
}

impl DecodeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
