use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the data layer.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("failed to open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("CSV row {row}: expected {expected} fields but found {found}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column not found: {0:?}")]
    ColumnNotFound(String),

    #[error("duplicate column name: {0:?}")]
    DuplicateColumn(String),

    #[error("column {column:?} has {found} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("chunk size must be at least 1")]
    ZeroChunkSize,

    #[error("failed to serialize memory report")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
