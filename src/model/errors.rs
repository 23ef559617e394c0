//! Record model errors

use thiserror::Error;

/// Result type for decoding request bodies into model values
pub type ModelResult<T> = Result<T, ModelError>;

/// Input rejected before any store interaction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Body is not valid JSON or lacks a required field
    #[error("invalid {kind} json: {reason}")]
    Malformed {
        kind: &'static str,
        reason: String,
    },

    /// Text offered as an opaque JSON document is not valid JSON
    #[error("invalid json document: {0}")]
    InvalidDocument(String),
}

impl ModelError {
    pub(crate) fn malformed(kind: &'static str, err: serde_json::Error) -> Self {
        Self::Malformed {
            kind,
            reason: err.to_string(),
        }
    }
}
