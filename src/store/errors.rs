//! Store error types
//!
//! Error codes:
//! - BENCH_STORE_CONNECT_FAILED
//! - BENCH_STORE_STATEMENT_FAILED
//! - BENCH_STORE_DECODE_FAILED
//! - BENCH_STORE_TIMEOUT
//!
//! All four surface to HTTP callers identically; the code only matters for logs
//! and tests.

use std::fmt;
use std::time::Duration;

/// Store error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// Could not open or acquire a connection
    ConnectFailed,
    /// The statement was rejected or failed during execution
    StatementFailed,
    /// A row came back in a shape the record model cannot hold
    DecodeFailed,
    /// The execution window elapsed before the store answered
    Timeout,
}

impl StoreErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::ConnectFailed => "BENCH_STORE_CONNECT_FAILED",
            StoreErrorCode::StatementFailed => "BENCH_STORE_STATEMENT_FAILED",
            StoreErrorCode::DecodeFailed => "BENCH_STORE_DECODE_FAILED",
            StoreErrorCode::Timeout => "BENCH_STORE_TIMEOUT",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure of a single store operation
#[derive(Debug, Clone)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn connect_failed(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::ConnectFailed, message)
    }

    pub fn statement_failed(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::StatementFailed, message)
    }

    pub fn decode_failed(message: impl Into<String>) -> Self {
        Self::new(StoreErrorCode::DecodeFailed, message)
    }

    /// The operation did not finish within `window`
    pub fn timeout(window: Duration) -> Self {
        Self::new(
            StoreErrorCode::Timeout,
            format!("store operation exceeded {}ms execution window", window.as_millis()),
        )
    }

    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    /// Driver error text, unmodified
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_timeout(&self) -> bool {
        self.code == StoreErrorCode::Timeout
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StoreError {}

impl From<tokio_postgres::Error> for StoreError {
    fn from(e: tokio_postgres::Error) -> Self {
        if e.is_closed() {
            Self::connect_failed(e.to_string())
        } else {
            Self::statement_failed(e.to_string())
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
