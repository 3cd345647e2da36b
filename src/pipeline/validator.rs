//! Fact-row validation and cleaning.
//!
//! Four steps, applied in order, each only ever removing rows:
//! required fields present, exact duplicates removed, destination code in the
//! reference vocabulary, state code not the "unspecified" sentinel.

use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use rayon::prelude::*;

use crate::error::Result;
use crate::filter::{
    BatchFilter, ExcludedCodesFilter, Expr, ExpressionFilter, VocabularyFilter, distinct_batches,
};
use crate::schema::REQUIRED_FACT_COLUMNS;
use crate::schema::fields::raw;
use crate::utils::arrow::total_rows;
use crate::utils::logging::log_row_counts;
use crate::vocabulary::Vocabulary;

/// Row counts observed after each cleaning step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleaningReport {
    /// Rows before cleaning
    pub input_rows: usize,
    /// Rows with every required field present
    pub after_required_fields: usize,
    /// Rows left after exact duplicates were removed
    pub after_deduplication: usize,
    /// Rows whose destination code is in the vocabulary
    pub after_vocabulary: usize,
    /// Rows whose state code is not the sentinel
    pub after_state_sentinel: usize,
}

impl CleaningReport {
    /// Rows removed across all steps
    #[must_use]
    pub fn removed(&self) -> usize {
        self.input_rows.saturating_sub(self.after_state_sentinel)
    }
}

/// Cleans raw fact batches
///
/// The vocabulary is injected at construction and never mutated, so a
/// validator can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct Validator {
    required: ExpressionFilter,
    vocabulary: VocabularyFilter,
    sentinel: ExcludedCodesFilter,
}

impl Validator {
    /// Create a validator for raw fact batches
    #[must_use]
    pub fn new(vocabulary: Arc<Vocabulary>, state_sentinel: &str) -> Self {
        Self {
            required: ExpressionFilter::new(Expr::all_not_null(&REQUIRED_FACT_COLUMNS)),
            vocabulary: VocabularyFilter::new(raw::I94PORT, vocabulary),
            sentinel: ExcludedCodesFilter::new(raw::I94ADDR, [state_sentinel]),
        }
    }

    fn apply_parallel(
        filter: &dyn BatchFilter,
        batches: Vec<RecordBatch>,
    ) -> Result<Vec<RecordBatch>> {
        if let Some(first) = batches.first() {
            filter.check_schema(&first.schema())?;
        }
        let filtered = batches
            .par_iter()
            .map(|batch| filter.filter(batch))
            .collect::<Result<Vec<_>>>()?;
        Ok(filtered
            .into_iter()
            .filter(|batch| batch.num_rows() > 0)
            .collect())
    }

    /// Run all cleaning steps and report the surviving row count after each
    ///
    /// Removal is silent: rows that fail a step are only reflected in the
    /// counts.
    pub fn clean(&self, batches: Vec<RecordBatch>) -> Result<(Vec<RecordBatch>, CleaningReport)> {
        let mut report = CleaningReport {
            input_rows: total_rows(&batches),
            ..CleaningReport::default()
        };

        let batches = Self::apply_parallel(&self.required, batches)?;
        report.after_required_fields = total_rows(&batches);
        log_row_counts(
            "Required fields",
            report.input_rows,
            report.after_required_fields,
        );

        // Global and sequential: first occurrence must hold across batches
        let batches = distinct_batches(&batches)?;
        report.after_deduplication = total_rows(&batches);
        log_row_counts(
            "Duplicate rows",
            report.after_required_fields,
            report.after_deduplication,
        );

        let batches = Self::apply_parallel(&self.vocabulary, batches)?;
        report.after_vocabulary = total_rows(&batches);
        log_row_counts(
            "Destination vocabulary",
            report.after_deduplication,
            report.after_vocabulary,
        );

        let batches = Self::apply_parallel(&self.sentinel, batches)?;
        report.after_state_sentinel = total_rows(&batches);
        log_row_counts(
            "State sentinel",
            report.after_vocabulary,
            report.after_state_sentinel,
        );

        Ok((batches, report))
    }
}
