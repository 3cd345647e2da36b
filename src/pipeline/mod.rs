//! The end-to-end star-schema run.
//!
//! Ingest fact sources into staging, clean, transform, derive the dimensions,
//! write the four output tables and finally run the quality gate over what was
//! written.

pub mod dimensions;
pub mod transform;
pub mod validator;

pub use dimensions::{Dimensions, derive_airports, derive_demographics, derive_dimensions};
pub use transform::{transform_batch, transform_fact};
pub use validator::{CleaningReport, Validator};

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::quality::{QualityGate, QualityReport};
use crate::reader::{
    IngestReport, ingest_fact_sources, read_airports, read_demographics, read_staged_facts,
    resolve_fact_sources,
};
use crate::schema::FACT_SCHEMA;
use crate::schema::fields::{fact, tables};
use crate::utils::io::{WriteMode, write_partitioned, write_table};
use crate::vocabulary::Vocabulary;

/// What a completed run did
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub ingest: IngestReport,
    pub cleaning: CleaningReport,
    /// Fact rows written per month partition
    pub fact_partitions: BTreeMap<String, usize>,
    /// Rows written per dimension table
    pub dimension_rows: BTreeMap<String, usize>,
    pub quality: QualityReport,
}

impl RunSummary {
    /// Total fact rows written
    #[must_use]
    pub fn fact_rows(&self) -> usize {
        self.fact_partitions.values().sum()
    }
}

/// A configured pipeline run
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    vocabulary: Option<Arc<Vocabulary>>,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            vocabulary: None,
        }
    }

    /// Use an already loaded vocabulary instead of reading `vocabulary_path`
    #[must_use]
    pub fn with_vocabulary(mut self, vocabulary: Arc<Vocabulary>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn staging_table(&self) -> PathBuf {
        self.config.staging_dir.join(tables::IMMIGRATION_RAW)
    }

    fn output_table(&self, table: &str) -> PathBuf {
        self.config.output_dir.join(table)
    }

    fn load_vocabulary(&self) -> Result<Arc<Vocabulary>> {
        match &self.vocabulary {
            Some(vocabulary) => Ok(Arc::clone(vocabulary)),
            None => Vocabulary::from_path(
                &self.config.vocabulary_path,
                &self.config.vocabulary_field,
            )
            .map(Arc::new),
        }
    }

    /// Run every stage on a thread pool sized from the configuration
    pub fn run(&self) -> Result<RunSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| PipelineError::Config(format!("cannot build thread pool: {e}")))?;
        pool.install(|| self.run_stages())
    }

    fn run_stages(&self) -> Result<RunSummary> {
        let start = Instant::now();
        let config = &self.config;
        let vocabulary = self.load_vocabulary()?;

        let sources =
            resolve_fact_sources(&config.fact_sources, config.fact_source_dir.as_deref())?;
        let staging = self.staging_table();
        if sources.is_empty() && (config.reset_staging || !staging.exists()) {
            return Err(PipelineError::Config(
                "no fact sources found and no staged facts to process".into(),
            ));
        }
        let ingest =
            ingest_fact_sources(&sources, &staging, config.batch_size, config.reset_staging)?;

        let raw = read_staged_facts(&staging, config.batch_size)?;
        let validator = Validator::new(vocabulary, &config.state_sentinel);
        let (cleaned, cleaning) = validator.clean(raw)?;
        let facts = transform_fact(&cleaned)?;
        drop(cleaned);

        let demographics = read_demographics(&config.demographics_path, config.batch_size)?;
        let airports = read_airports(&config.airports_path, config.batch_size)?;
        let dimensions = derive_dimensions(&demographics, &airports, &facts)?;

        let fact_partitions = if facts.is_empty() {
            write_table(
                &self.output_table(tables::IMMIGRATION),
                FACT_SCHEMA.clone(),
                &facts,
                WriteMode::Overwrite,
            )?;
            BTreeMap::new()
        } else {
            write_partitioned(
                &self.output_table(tables::IMMIGRATION),
                &facts,
                fact::MONTH,
                WriteMode::Overwrite,
            )?
        };

        let [city_schema, states_schema, airports_schema] = Dimensions::schemas();
        let mut dimension_rows = BTreeMap::new();
        for (table, schema, batches) in [
            (tables::CITY_DEMOGRAPHICS, city_schema, &dimensions.city_demographics),
            (tables::STATES, states_schema, &dimensions.states),
            (tables::AIRPORTS, airports_schema, &dimensions.airports),
        ] {
            let dir = self.output_table(table);
            let rows = write_table(&dir, schema, batches, WriteMode::Overwrite)?;
            dimension_rows.insert(table.to_string(), rows);
        }

        let quality = QualityGate::new(&config.output_dir, config.batch_size).run()?;

        let summary = RunSummary {
            ingest,
            cleaning,
            fact_partitions,
            dimension_rows,
            quality,
        };
        log::info!(
            "Star schema built in {:?}: {} fact rows in {} partitions, {} dimension rows",
            start.elapsed(),
            summary.fact_rows(),
            summary.fact_partitions.len(),
            summary.dimension_rows.values().sum::<usize>()
        );
        Ok(summary)
    }
}
