use thiserror::Error;

use crate::WidgetId;

/// Errors that can occur while encoding or decoding wire messages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// A reference names a widget the receiver does not know, or one that is closed
    #[error("Reference to widget {widget} cannot be resolved: no such live widget")]
    UnresolvedReference { widget: WidgetId },

    /// A state entry does not have the shape its attribute requires
    #[error("Malformed value for `{attribute}`: {reason}")]
    Malformed { attribute: String, reason: String },

    /// A buffer path does not address an attribute or a tuple element
    #[error("Invalid buffer path {path}")]
    InvalidBufferPath { path: String },

    #[error("Message carries {buffers} buffers for {paths} buffer paths")]
    BufferCountMismatch { paths: usize, buffers: usize },

    /// The message text is not valid JSON for any known method
    #[error("Cannot decode message: {reason}")]
    Json { reason: String },
}

impl From<serde_json::Error> for WireError {
    fn from(error: serde_json::Error) -> Self {
        WireError::Json {
            reason: error.to_string(),
        }
    }
}
