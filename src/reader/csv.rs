//! Delimited text sources.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::{PipelineError, Result};
use crate::schema::adapt::conversions::cast_lenient;
use crate::utils::arrow::total_rows;
use crate::utils::logging::{Transfer, log_operation_start, log_rows_transferred};

/// Layout of a delimited file
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    /// Field delimiter
    pub delimiter: u8,
    /// Escape character for embedded delimiters and quotes
    pub escape: Option<u8>,
    /// Whether the first line is a header
    pub has_header: bool,
    /// Rows per record batch
    pub batch_size: usize,
}

impl CsvOptions {
    /// Comma-delimited with a header row
    #[must_use]
    pub fn comma(batch_size: usize) -> Self {
        Self {
            delimiter: b',',
            escape: None,
            has_header: true,
            batch_size,
        }
    }

    /// Semicolon-delimited with a header row
    #[must_use]
    pub fn semicolon(batch_size: usize) -> Self {
        Self {
            delimiter: b';',
            ..Self::comma(batch_size)
        }
    }

    /// Use `escape` for embedded delimiters
    #[must_use]
    pub fn with_escape(self, escape: u8) -> Self {
        Self {
            escape: Some(escape),
            ..self
        }
    }

    fn builder(&self, schema: SchemaRef) -> ReaderBuilder {
        let builder = ReaderBuilder::new(schema)
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
            .with_batch_size(self.batch_size);
        match self.escape {
            Some(escape) => builder.with_escape(escape),
            None => builder,
        }
    }
}

fn text_schema(schema: &Schema) -> SchemaRef {
    Arc::new(Schema::new(
        schema
            .fields()
            .iter()
            .map(|field| Field::new(field.name(), DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ))
}

fn cast_to_schema(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch> {
    let columns = batch
        .columns()
        .iter()
        .zip(schema.fields())
        .map(|(column, field)| cast_lenient(column, field.data_type()))
        .collect::<Result<Vec<_>>>()?;
    Ok(RecordBatch::try_new(Arc::clone(schema), columns)?)
}

/// Read a delimited file whose columns are given, by position, by `schema`
///
/// The header row (if any) is skipped rather than matched, so `schema` must
/// list the columns in file order. Fields are read as text first; empty or
/// unparseable values in typed columns become null.
pub fn read_csv(path: &Path, schema: SchemaRef, options: &CsvOptions) -> Result<Vec<RecordBatch>> {
    let start = std::time::Instant::now();
    log_operation_start("Reading delimited file", path);

    let file = File::open(path).map_err(PipelineError::io_at(path))?;
    let reader = options.builder(text_schema(&schema)).build(file)?;
    let batches = reader
        .map(|batch| cast_to_schema(&batch?, &schema))
        .collect::<Result<Vec<_>>>()?;

    log_rows_transferred(
        Transfer::Read,
        path,
        total_rows(&batches),
        Some(start.elapsed()),
    );
    Ok(batches)
}

/// Read a delimited file with a header, keeping every column as text
///
/// Column names come from the header, so columns may appear in any order;
/// typing is left to the caller.
pub fn read_csv_as_text(path: &Path, options: &CsvOptions) -> Result<Vec<RecordBatch>> {
    let mut file = File::open(path).map_err(PipelineError::io_at(path))?;

    let mut format = Format::default()
        .with_header(true)
        .with_delimiter(options.delimiter);
    if let Some(escape) = options.escape {
        format = format.with_escape(escape);
    }
    let (inferred, _) = format.infer_schema(&mut file, Some(1))?;
    file.seek(SeekFrom::Start(0))
        .map_err(PipelineError::io_at(path))?;

    let reader = options.builder(text_schema(&inferred)).build(file)?;
    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}
