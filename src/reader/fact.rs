//! Immigration fact sources and their ingestion into the staging dataset.

use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use rayon::prelude::*;

use crate::error::{PipelineError, Result};
use crate::reader::csv::{CsvOptions, read_csv_as_text};
use crate::schema::{RAW_FACT_SCHEMA, conform_batch};
use crate::utils::arrow::total_rows;
use crate::utils::io::{WriteMode, find_files_with_extensions, read_parquet, read_table, write_table};
use crate::utils::logging::{create_main_progress_bar, finish_progress_bar, log_operation_start};

/// Extensions recognised as fact sources
pub const FACT_SOURCE_EXTENSIONS: [&str; 2] = ["parquet", "csv"];

/// Read one fact source and conform it to the canonical raw schema
///
/// Parquet and comma-delimited CSV are supported, chosen by extension.
pub fn read_fact_source(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let batches = match extension.as_deref() {
        Some("parquet") => read_parquet(path, batch_size)?,
        Some("csv") => read_csv_as_text(path, &CsvOptions::comma(batch_size))?,
        _ => {
            return Err(PipelineError::Config(format!(
                "unsupported fact source format: {}",
                path.display()
            )));
        }
    };

    let source = path.display().to_string();
    batches
        .iter()
        .map(|batch| conform_batch(batch, &RAW_FACT_SCHEMA, &source))
        .collect()
}

/// Resolve the configured fact sources: explicit files first, then the
/// directory's files sorted by name
pub fn resolve_fact_sources(explicit: &[PathBuf], dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let mut sources = explicit.to_vec();
    if let Some(dir) = dir {
        for path in find_files_with_extensions(dir, &FACT_SOURCE_EXTENSIONS)? {
            if !sources.contains(&path) {
                sources.push(path);
            }
        }
    }
    Ok(sources)
}

/// Outcome of appending fact sources to the staging dataset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of source files appended
    pub sources: usize,
    /// Rows appended across all sources
    pub rows: usize,
}

/// Append every source to the staging table at `staging_table`
///
/// Sources are read in parallel and appended in the given order, one part file
/// per source. When `reset` is set, the staging table is cleared first.
pub fn ingest_fact_sources(
    sources: &[PathBuf],
    staging_table: &Path,
    batch_size: usize,
    reset: bool,
) -> Result<IngestReport> {
    log_operation_start("Ingesting fact sources into", staging_table);
    if reset && staging_table.exists() {
        std::fs::remove_dir_all(staging_table).map_err(PipelineError::io_at(staging_table))?;
    }

    let pb = create_main_progress_bar(sources.len() as u64, Some("reading fact sources"));
    let loaded = sources
        .par_iter()
        .map(|path| {
            let batches = read_fact_source(path, batch_size);
            pb.inc(1);
            batches
        })
        .collect::<Result<Vec<_>>>()?;
    finish_progress_bar(&pb, "fact sources read");

    let mut report = IngestReport::default();
    for (path, batches) in sources.iter().zip(loaded) {
        let rows = write_table(
            staging_table,
            RAW_FACT_SCHEMA.clone(),
            &batches,
            WriteMode::Append,
        )?;
        log::info!("Appended {rows} rows from {}", path.display());
        report.sources += 1;
        report.rows += rows;
    }
    Ok(report)
}

/// Read the whole staging dataset
pub fn read_staged_facts(staging_table: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let batches = read_table(staging_table, batch_size)?;
    log::info!("Staging dataset holds {} rows", total_rows(&batches));
    Ok(batches)
}
