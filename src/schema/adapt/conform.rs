//! Conforming source batches to a canonical schema.

use std::sync::Arc;

use arrow::array::ArrayRef;
use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::error::{PipelineError, Result};
use crate::schema::adapt::conversions::cast_lenient;

/// Find a column by name, falling back to a case-insensitive match
fn find_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a ArrayRef> {
    batch.column_by_name(name).or_else(|| {
        let schema = batch.schema();
        schema
            .fields()
            .iter()
            .position(|field| field.name().eq_ignore_ascii_case(name))
            .map(|idx| batch.column(idx))
    })
}

/// Project and cast `batch` to exactly the columns of `target`, in order
///
/// Columns not in `target` are dropped. A missing target column is a schema
/// error naming `source`; values that do not cast become null.
pub fn conform_batch(batch: &RecordBatch, target: &SchemaRef, source: &str) -> Result<RecordBatch> {
    let columns = target
        .fields()
        .iter()
        .map(|field| {
            let column = find_column(batch, field.name())
                .ok_or_else(|| PipelineError::missing_column(field.name(), source))?;
            cast_lenient(column, field.data_type())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RecordBatch::try_new(Arc::clone(target), columns)?)
}
