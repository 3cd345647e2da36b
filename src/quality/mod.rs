//! Post-write data quality checks.
//!
//! Every output table is read back from disk and checked for rows, and each
//! dimension must share at least one key value with the fact table. All checks
//! run before the gate reports; a failing gate lists every violation.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;

use crate::error::{PipelineError, QualityViolation, Result};
use crate::schema::fields::{airports, demographics, fact, tables};
use crate::utils::arrow::{distinct_codes, total_rows};
use crate::utils::io::read_table;
use crate::utils::logging::log_operation_start;

/// Non-emptiness check over the table actually passed in
#[must_use]
pub fn check_not_empty(table: &str, batches: &[RecordBatch]) -> Option<QualityViolation> {
    if total_rows(batches) == 0 {
        return Some(QualityViolation::EmptyTable {
            table: table.to_string(),
        });
    }
    log::info!("Quality check passed: {table} has {} rows", total_rows(batches));
    None
}

/// One side of a key relationship: a table and the column holding the key
#[derive(Debug, Clone, Copy)]
pub struct KeyRef<'a> {
    pub table: &'a str,
    pub column: &'a str,
    pub batches: &'a [RecordBatch],
}

/// Referential overlap check: at least one non-null key value is shared
pub fn check_key_overlap(
    dimension: KeyRef<'_>,
    fact: KeyRef<'_>,
) -> Result<Option<QualityViolation>> {
    let dimension_keys = distinct_codes(dimension.batches, dimension.column)?;
    let fact_keys = distinct_codes(fact.batches, fact.column)?;
    let shared = dimension_keys.intersection(&fact_keys).count();

    if shared == 0 {
        return Ok(Some(QualityViolation::NoSharedKeys {
            dimension: dimension.table.to_string(),
            dimension_key: dimension.column.to_string(),
            fact: fact.table.to_string(),
            fact_key: fact.column.to_string(),
        }));
    }
    log::info!(
        "Quality check passed: {shared} values of {}.{} appear in {}.{}",
        dimension.table,
        dimension.column,
        fact.table,
        fact.column
    );
    Ok(None)
}

/// Row counts of the tables that passed the gate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub table_rows: BTreeMap<String, usize>,
}

/// Relationships checked by the gate: (dimension table, dimension key, fact key)
pub const KEY_RELATIONSHIPS: [(&str, &str, &str); 3] = [
    (tables::AIRPORTS, airports::IATA, fact::DESTINATION_CODE),
    (tables::STATES, demographics::CODE, fact::STATE_CODE),
    (tables::CITY_DEMOGRAPHICS, demographics::STATE_CODE, fact::STATE_CODE),
];

/// Runs every check against the tables under an output directory
#[derive(Debug, Clone)]
pub struct QualityGate {
    output_dir: PathBuf,
    batch_size: usize,
}

impl QualityGate {
    #[must_use]
    pub fn new(output_dir: &Path, batch_size: usize) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            batch_size,
        }
    }

    fn load(&self, table: &str) -> Result<Vec<RecordBatch>> {
        let dir = self.output_dir.join(table);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        read_table(&dir, self.batch_size)
    }

    /// Re-read all four tables and check them
    pub fn run(&self) -> Result<QualityReport> {
        log_operation_start("Running quality checks on", &self.output_dir);

        let fact_batches = self.load(tables::IMMIGRATION)?;
        let mut loaded: BTreeMap<&str, Vec<RecordBatch>> = BTreeMap::new();
        for table in [tables::CITY_DEMOGRAPHICS, tables::STATES, tables::AIRPORTS] {
            loaded.insert(table, self.load(table)?);
        }

        let mut violations = Vec::new();
        violations.extend(check_not_empty(tables::IMMIGRATION, &fact_batches));
        for (table, batches) in &loaded {
            violations.extend(check_not_empty(table, batches));
        }

        for (table, dimension_key, fact_key) in KEY_RELATIONSHIPS {
            // A missing table has no keys at all
            let batches = loaded.get(table).map_or(&[][..], Vec::as_slice);
            let dimension = KeyRef {
                table,
                column: dimension_key,
                batches,
            };
            let fact = KeyRef {
                table: tables::IMMIGRATION,
                column: fact_key,
                batches: &fact_batches,
            };
            violations.extend(check_key_overlap(dimension, fact)?);
        }

        if !violations.is_empty() {
            for violation in &violations {
                log::error!("Quality check failed: {violation}");
            }
            return Err(PipelineError::Quality(violations));
        }

        let mut table_rows: BTreeMap<String, usize> = loaded
            .iter()
            .map(|(table, batches)| ((*table).to_string(), total_rows(batches)))
            .collect();
        table_rows.insert(tables::IMMIGRATION.to_string(), total_rows(&fact_batches));
        Ok(QualityReport { table_rows })
    }
}
