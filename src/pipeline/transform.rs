//! Raw fact rows to the typed, renamed fact table.

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use rayon::prelude::*;

use crate::error::Result;
use crate::schema::adapt::{cast_lenient, day_offsets_to_dates, match_flags, normalize_codes};
use crate::schema::{DROPPED_FACT_COLUMNS, Derivation, FACT_COLUMNS, FACT_SCHEMA, FactColumn};
use crate::utils::arrow::{column_by_name, drop_columns};

fn derive_column(batch: &RecordBatch, column: &FactColumn) -> Result<ArrayRef> {
    let raw = column_by_name(batch, column.raw)?;
    match column.derivation {
        Derivation::Cast => cast_lenient(raw, &column.data_type),
        Derivation::DayOffsetDate => day_offsets_to_dates(raw),
        Derivation::MatchFlag => match_flags(raw),
        Derivation::Code => cast_lenient(&normalize_codes(raw)?, &DataType::Utf8),
    }
}

/// Transform one cleaned raw batch into a fact batch
pub fn transform_batch(batch: &RecordBatch) -> Result<RecordBatch> {
    let kept = drop_columns(batch, &DROPPED_FACT_COLUMNS)?;
    let columns = FACT_COLUMNS
        .iter()
        .map(|column| derive_column(&kept, column))
        .collect::<Result<Vec<_>>>()?;
    Ok(RecordBatch::try_new(FACT_SCHEMA.clone(), columns)?)
}

/// Transform cleaned raw batches into fact batches, one output batch per input
///
/// Dates that cannot be derived from their day offset are null; the row is
/// kept.
pub fn transform_fact(batches: &[RecordBatch]) -> Result<Vec<RecordBatch>> {
    batches.par_iter().map(transform_batch).collect()
}
