//! Exact-duplicate removal across record batches.
//!
//! Rows are encoded with Arrow's row format, which gives every row a
//! byte-comparable representation; two rows are duplicates iff their
//! encodings are equal.

use arrow::array::BooleanArray;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};
use rustc_hash::FxHashSet;

use crate::error::{PipelineError, Result};
use crate::filter::core::filter_record_batch;

/// Stateful filter keeping the first occurrence of each distinct row
///
/// The same deduplicator must see every batch of a table, in order, for
/// "first occurrence" to hold across batches.
#[derive(Debug)]
pub struct RowDeduplicator {
    schema: SchemaRef,
    converter: RowConverter,
    seen: FxHashSet<Box<[u8]>>,
}

impl RowDeduplicator {
    /// Create a deduplicator for batches of `schema`
    pub fn new(schema: SchemaRef) -> Result<Self> {
        let fields = schema
            .fields()
            .iter()
            .map(|field| SortField::new(field.data_type().clone()))
            .collect();
        Ok(Self {
            converter: RowConverter::new(fields)?,
            schema,
            seen: FxHashSet::default(),
        })
    }

    /// Remove rows already seen in this or an earlier batch
    pub fn filter(&mut self, batch: &RecordBatch) -> Result<RecordBatch> {
        if batch.schema().fields() != self.schema.fields() {
            return Err(PipelineError::Schema(
                "batch schema differs from the deduplicator schema".into(),
            ));
        }

        let rows = self.converter.convert_columns(batch.columns())?;
        let mask: BooleanArray = rows
            .iter()
            .map(|row| Some(self.seen.insert(row.as_ref().into())))
            .collect();
        filter_record_batch(batch, &mask)
    }

    /// Number of distinct rows seen so far
    #[must_use]
    pub fn distinct_rows(&self) -> usize {
        self.seen.len()
    }
}

/// Deduplicate a whole table, keeping the first occurrence of every row
pub fn distinct_batches(batches: &[RecordBatch]) -> Result<Vec<RecordBatch>> {
    let Some(first) = batches.first() else {
        return Ok(Vec::new());
    };
    let mut dedup = RowDeduplicator::new(first.schema())?;
    batches
        .iter()
        .map(|batch| dedup.filter(batch))
        .filter(|result| !matches!(result, Ok(b) if b.num_rows() == 0))
        .collect()
}
