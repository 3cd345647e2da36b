//! Utilities for working with Arrow arrays and record batches.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;

use crate::error::{PipelineError, Result};
use crate::vocabulary::normalize_code;

/// Get a column from a record batch by name
pub fn column_by_name<'a>(batch: &'a RecordBatch, column_name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(column_name)
        .ok_or_else(|| PipelineError::missing_column(column_name, "record batch"))
}

/// Get a column as UTF-8 strings, casting other types
///
/// Null values stay null. Numeric columns are rendered with Arrow's cast,
/// so `5.0f64` becomes `"5"` only after [`normalize_code`].
pub fn string_column(batch: &RecordBatch, column_name: &str) -> Result<StringArray> {
    utf8_array(column_by_name(batch, column_name)?)
}

/// View any array as UTF-8 strings, casting other types
pub fn utf8_array(array: &ArrayRef) -> Result<StringArray> {
    let utf8 = match array.data_type() {
        DataType::Utf8 => Arc::clone(array),
        _ => cast(array, &DataType::Utf8)?,
    };
    utf8.as_string_opt::<i32>().cloned().ok_or_else(|| {
        PipelineError::Schema(format!("cannot read {} values as text", array.data_type()))
    })
}

/// Total row count across batches
#[must_use]
pub fn total_rows(batches: &[RecordBatch]) -> usize {
    batches.iter().map(RecordBatch::num_rows).sum()
}

/// Distinct non-null values of a column across batches, normalized as codes
pub fn distinct_codes(batches: &[RecordBatch], column_name: &str) -> Result<FxHashSet<String>> {
    let mut codes = FxHashSet::default();
    for batch in batches {
        let values = string_column(batch, column_name)?;
        codes.extend(
            values
                .iter()
                .flatten()
                .map(|value| normalize_code(value).into_owned()),
        );
    }
    Ok(codes)
}

/// Drop the named columns from a batch; unknown names are ignored
pub fn drop_columns(batch: &RecordBatch, columns: &[&str]) -> Result<RecordBatch> {
    let keep: Vec<usize> = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| !columns.contains(&field.name().as_str()))
        .map(|(idx, _)| idx)
        .collect();
    Ok(batch.project(&keep)?)
}

/// Select and rename columns: each `(from, to)` pair becomes one output column, in order
pub fn select_renamed(batch: &RecordBatch, mapping: &[(&str, &str)]) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields = Vec::with_capacity(mapping.len());
    let mut columns = Vec::with_capacity(mapping.len());
    for (from, to) in mapping {
        let idx = schema
            .index_of(from)
            .map_err(|_| PipelineError::missing_column(from, "record batch"))?;
        fields.push(schema.field(idx).clone().with_name(*to));
        columns.push(Arc::clone(batch.column(idx)));
    }
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
