//! Error types for bankforge.

use thiserror::Error;

/// Result type alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for dataset loading, view computation, and rendering.
#[derive(Error, Debug)]
pub enum Error {
    #[error("dataset not found: {path}")]
    MissingDataset { path: String },

    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown view: {name}")]
    UnknownView { name: String },

    #[error("chart rendering failed: {0}")]
    Chart(String),
}
