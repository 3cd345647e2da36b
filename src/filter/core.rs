//! Core filtering functionality
//!
//! Defines the [`BatchFilter`] trait and the helper shared by every filter:
//! applying a boolean mask to a batch.

use std::collections::HashSet;

use arrow::array::BooleanArray;
use arrow::compute::filter_record_batch as arrow_filter_record_batch;
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use itertools::Itertools;

use crate::error::{PipelineError, Result};

/// Filter a record batch based on a boolean mask
///
/// Rows where the mask is false or null are removed.
pub fn filter_record_batch(batch: &RecordBatch, mask: &BooleanArray) -> Result<RecordBatch> {
    if batch.num_rows() != mask.len() {
        return Err(PipelineError::Filter(format!(
            "Mask length ({}) doesn't match batch row count ({})",
            mask.len(),
            batch.num_rows()
        )));
    }
    Ok(arrow_filter_record_batch(batch, mask)?)
}

/// Trait for objects that can filter record batches
pub trait BatchFilter: std::fmt::Debug + Send + Sync {
    /// Compute the keep-mask for a batch
    fn evaluate(&self, batch: &RecordBatch) -> Result<BooleanArray>;

    /// Returns the set of column names required by this filter
    fn required_columns(&self) -> HashSet<String>;

    /// Check that `schema` has every column this filter reads
    fn check_schema(&self, schema: &Schema) -> Result<()> {
        match self
            .required_columns()
            .into_iter()
            .sorted()
            .find(|column| schema.index_of(column).is_err())
        {
            Some(missing) => Err(PipelineError::missing_column(&missing, "filter input")),
            None => Ok(()),
        }
    }

    /// Filter a record batch
    fn filter(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        let mask = self.evaluate(batch)?;
        filter_record_batch(batch, &mask)
    }
}
