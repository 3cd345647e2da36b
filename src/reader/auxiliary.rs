//! Auxiliary flat files: city demographics and the airport registry.

use std::path::Path;

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::reader::csv::{CsvOptions, read_csv};
use crate::schema::{RAW_AIRPORTS_SCHEMA, RAW_DEMOGRAPHICS_SCHEMA};

/// Escape character the airport registry uses inside quoted fields
pub const AIRPORTS_ESCAPE: u8 = b'\\';

/// Read the semicolon-delimited city demographics file
pub fn read_demographics(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    read_csv(
        path,
        RAW_DEMOGRAPHICS_SCHEMA.clone(),
        &CsvOptions::semicolon(batch_size),
    )
}

/// Read the semicolon-delimited airport registry
pub fn read_airports(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    read_csv(
        path,
        RAW_AIRPORTS_SCHEMA.clone(),
        &CsvOptions::semicolon(batch_size).with_escape(AIRPORTS_ESCAPE),
    )
}
