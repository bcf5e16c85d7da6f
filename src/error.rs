//! Error types.
//!
//! Library code returns [`TrackerError`]. The binaries convert it into
//! [`AppError`], which carries the process exit code:
//!
//! - `2`: input problems (missing file, missing required columns, bad CSV)
//! - `3`: invalid selection (e.g. start date after end date)
//! - `4`: output/internal failures (exports, terminal I/O)

use chrono::NaiveDate;
use thiserror::Error;

/// Domain errors raised by the pipeline and the selector.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Required columns are absent from the input header.
    #[error("Schema error: missing required column `{column}`")]
    Schema { column: String },

    /// A date range whose start is after its end.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TrackerError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Exit code used when this error reaches a binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            TrackerError::Schema { .. } | TrackerError::Csv(_) => 2,
            TrackerError::Io { .. } => 2,
            TrackerError::InvalidRange { .. } => 3,
            TrackerError::Json(_) => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
