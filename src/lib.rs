//! Builds an immigration star schema from raw I-94 arrival records.
//!
//! Raw fact sources are staged, cleaned against a reference vocabulary,
//! reshaped into a typed fact table and written as Parquet next to three
//! dimension tables (city demographics, states, airports). A quality gate
//! re-reads everything that was written before a run is reported as done.

pub mod config;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod quality;
pub mod reader;
pub mod schema;
pub mod utils;
pub mod vocabulary;

// Core types
pub use config::PipelineConfig;
pub use error::{PipelineError, QualityViolation, Result};
pub use pipeline::{CleaningReport, Pipeline, RunSummary, Validator};
pub use quality::{QualityGate, QualityReport};
pub use vocabulary::{Vocabulary, normalize_code};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Row-level functions
pub use schema::adapt::{day_offset_to_date, is_match};

// Utility functions
pub use utils::io::{DEFAULT_BATCH_SIZE, WriteMode, read_table};
