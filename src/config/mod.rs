//! Configuration for the star-schema pipeline.
//!
//! Every field has a default, so a configuration file only needs to name the
//! values that differ from the standard layout.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::utils::io::parquet::DEFAULT_BATCH_SIZE;

/// Field of the vocabulary file holding the valid port codes
pub const DEFAULT_VOCABULARY_FIELD: &str = "i94port";

/// State code meaning "not specified" in the source data
pub const DEFAULT_STATE_SENTINEL: &str = "99";

/// Configuration for a pipeline run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Explicit fact source files (Parquet or CSV), ingested in order
    pub fact_sources: Vec<PathBuf>,
    /// Directory scanned for additional `.parquet` / `.csv` fact sources
    pub fact_source_dir: Option<PathBuf>,
    /// Semicolon-delimited city demographics file
    pub demographics_path: PathBuf,
    /// Semicolon-delimited airport registry file
    pub airports_path: PathBuf,
    /// JSON file mapping vocabulary fields to code/label maps
    pub vocabulary_path: PathBuf,
    /// Vocabulary field used to validate destination codes
    pub vocabulary_field: String,
    /// State code excluded during cleaning
    pub state_sentinel: String,
    /// Where raw fact sources are appended before cleaning
    pub staging_dir: PathBuf,
    /// Root of the four output tables
    pub output_dir: PathBuf,
    /// Rows per record batch when reading
    pub batch_size: usize,
    /// Worker threads for batch processing
    pub threads: usize,
    /// Clear the staging dataset before ingesting
    pub reset_staging: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fact_sources: Vec::new(),
            fact_source_dir: Some(PathBuf::from("data/immigration")),
            demographics_path: PathBuf::from("data/us-cities-demographics.csv"),
            airports_path: PathBuf::from("data/airports.csv"),
            vocabulary_path: PathBuf::from("data/i94_labels.json"),
            vocabulary_field: DEFAULT_VOCABULARY_FIELD.to_string(),
            state_sentinel: DEFAULT_STATE_SENTINEL.to_string(),
            staging_dir: PathBuf::from("staging"),
            output_dir: PathBuf::from("output"),
            batch_size: DEFAULT_BATCH_SIZE,
            threads: num_cpus::get(),
            reset_staging: false,
        }
    }
}

/// Batch size override from the environment
#[must_use]
pub fn get_batch_size() -> Option<usize> {
    std::env::var("PARQUET_BATCH_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
}

impl PipelineConfig {
    /// Load a configuration file, applying environment overrides
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(PipelineError::io_at(path))?;
        let mut config = Self::from_json_str(&content)?;
        if let Some(batch_size) = get_batch_size() {
            config.batch_size = batch_size;
        }
        Ok(config)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Check that the configuration can drive a run before any work starts
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PipelineError::Config("batch_size must be positive".into()));
        }
        if self.threads == 0 {
            return Err(PipelineError::Config("threads must be positive".into()));
        }
        if self.fact_sources.is_empty() && self.fact_source_dir.is_none() {
            return Err(PipelineError::Config(
                "no fact sources: set fact_sources or fact_source_dir".into(),
            ));
        }

        let inputs = [
            ("demographics_path", &self.demographics_path),
            ("airports_path", &self.airports_path),
            ("vocabulary_path", &self.vocabulary_path),
        ];
        for (name, path) in inputs.into_iter().chain(
            self.fact_sources
                .iter()
                .map(|p| ("fact_sources", p)),
        ) {
            if !path.is_file() {
                return Err(PipelineError::Config(format!(
                    "{name}: file not found: {}",
                    path.display()
                )));
            }
        }
        if let Some(dir) = &self.fact_source_dir {
            if !dir.is_dir() {
                return Err(PipelineError::Config(format!(
                    "fact_source_dir: directory not found: {}",
                    dir.display()
                )));
            }
        }

        if self.staging_dir == self.output_dir {
            return Err(PipelineError::Config(
                "staging_dir and output_dir must differ".into(),
            ));
        }
        Ok(())
    }
}
