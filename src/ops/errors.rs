//! Operation errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ModelError;
use crate::store::{StoreError, StoreErrorCode};

/// Result type for request operations
pub type OpResult<T> = Result<T, OpError>;

/// Terminal failure of one request. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpError {
    /// Body or query parameter failed to decode
    #[error("{0}")]
    MalformedInput(String),

    /// The lookup matched no row
    #[error("{0} record not found")]
    NotFound(&'static str),

    /// Connection, statement or deadline failure
    #[error("{message}")]
    Store {
        code: StoreErrorCode,
        message: String,
    },
}

impl OpError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            OpError::MalformedInput(_) => 400,
            OpError::NotFound(_) => 404,
            OpError::Store { .. } => 500,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            OpError::Store {
                code: StoreErrorCode::Timeout,
                ..
            }
        )
    }
}

impl From<ModelError> for OpError {
    fn from(e: ModelError) -> Self {
        OpError::MalformedInput(e.to_string())
    }
}

/// How much of a store failure reaches the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorExposure {
    /// Driver error text is passed through unchanged
    #[default]
    Verbatim,
    /// Callers see a fixed message; the detail only goes to the log
    Redacted,
}

impl ErrorExposure {
    pub const REDACTED_MESSAGE: &'static str = "internal store error";

    pub fn from_flag(expose_store_errors: bool) -> Self {
        if expose_store_errors {
            Self::Verbatim
        } else {
            Self::Redacted
        }
    }

    pub fn apply(&self, err: &StoreError) -> OpError {
        let message = match self {
            ErrorExposure::Verbatim => err.message().to_string(),
            ErrorExposure::Redacted => Self::REDACTED_MESSAGE.to_string(),
        };
        OpError::Store {
            code: err.code(),
            message,
        }
    }
}
