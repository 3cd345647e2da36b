//! Error handling for the star-schema pipeline.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use itertools::Itertools;
use parquet::errors::ParquetError;

/// Errors that can occur while building the star schema
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// IO error tied to a specific path
    #[error("IO error at {}: {source}", .path.display())]
    IoAt {
        /// Path that was being accessed
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error decoding JSON (configuration or vocabulary)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A source does not match the expected schema
    #[error("Schema error: {0}")]
    Schema(String),

    /// Filter evaluation failed
    #[error("Filter error: {0}")]
    Filter(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The reference vocabulary could not be used
    #[error("Vocabulary error: {0}")]
    Vocabulary(String),

    /// One or more post-write quality checks failed
    #[error("Quality checks failed: {}", .0.iter().join("; "))]
    Quality(Vec<QualityViolation>),
}

impl PipelineError {
    /// Build a closure that attaches `path` to an IO error, for use with `map_err`
    pub fn io_at(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::IoAt {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for a missing column
    #[must_use]
    pub fn missing_column(column: &str, context: &str) -> Self {
        Self::Schema(format!("column '{column}' not found in {context}"))
    }
}

/// A single failed quality check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityViolation {
    /// The table holds no rows after the run
    EmptyTable {
        /// Table name
        table: String,
    },
    /// The dimension and the fact table share no key value
    NoSharedKeys {
        /// Dimension table name
        dimension: String,
        /// Key column in the dimension table
        dimension_key: String,
        /// Fact table name
        fact: String,
        /// Key column in the fact table
        fact_key: String,
    },
}

impl fmt::Display for QualityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable { table } => write!(f, "table '{table}' contains no rows"),
            Self::NoSharedKeys {
                dimension,
                dimension_key,
                fact,
                fact_key,
            } => write!(
                f,
                "no value of {dimension}.{dimension_key} appears in {fact}.{fact_key}"
            ),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
