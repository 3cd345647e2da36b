//! Parquet file operations
//!
//! Reading Parquet files into Arrow record batches and writing tables back,
//! either as a single file or split Hive-style into one directory per value
//! of a partition column (`month=4/part-00000.parquet`).

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt32Array, new_null_array};
use arrow::compute::{cast, take_record_batch};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use itertools::Itertools;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rayon::prelude::*;

use crate::error::{PipelineError, Result};
use crate::utils::arrow::{drop_columns, string_column, total_rows};
use crate::utils::logging::{Transfer, log_operation_start, log_rows_transferred, log_warning};

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Directory value used for rows whose partition column is null
pub const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// How a write treats data already present at the target location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Add new part files next to the existing ones
    Append,
    /// Remove the target location before writing
    Overwrite,
}

/// Validates that a directory exists and is a directory
pub fn validate_directory(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(PipelineError::IoAt {
            path: dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory does not exist"),
        });
    }
    Ok(())
}

/// Find files with one of the given extensions directly inside `dir`, sorted by name
pub fn find_files_with_extensions(dir: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    validate_directory(dir)?;

    let files = fs::read_dir(dir)
        .map_err(PipelineError::io_at(dir))?
        .map(|entry| entry.map(|e| e.path()).map_err(PipelineError::io_at(dir)))
        .filter_ok(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.contains(&ext))
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sorted()
        .collect_vec();

    if files.is_empty() {
        log_warning("No matching files found in directory", Some(dir));
    }
    Ok(files)
}

/// Read a Parquet file into Arrow record batches
pub fn read_parquet(path: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    let start = std::time::Instant::now();
    let file = File::open(path).map_err(PipelineError::io_at(path))?;

    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(batch_size)
        .build()?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;

    log::debug!(
        "Read {} rows from {} in {:?}",
        total_rows(&batches),
        path.display(),
        start.elapsed()
    );
    Ok(batches)
}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Write batches to a single Parquet file
pub fn write_parquet_file(path: &Path, schema: SchemaRef, batches: &[RecordBatch]) -> Result<()> {
    let file = File::create(path).map_err(PipelineError::io_at(path))?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(writer_properties()))?;
    for batch in batches {
        writer.write(batch)?;
    }
    writer.close()?;
    Ok(())
}

/// Index of a `part-NNNNN.parquet` file name
fn part_index(name: &str) -> Option<usize> {
    name.strip_prefix("part-")?
        .strip_suffix(".parquet")?
        .parse()
        .ok()
}

/// Prepare a table directory for writing and return the next free part file path
///
/// The next part is numbered one past the highest existing index, so removed
/// parts never cause a later append to reuse a live file name.
fn prepare_table_dir(dir: &Path, mode: WriteMode) -> Result<PathBuf> {
    if mode == WriteMode::Overwrite && dir.exists() {
        fs::remove_dir_all(dir).map_err(PipelineError::io_at(dir))?;
    }
    fs::create_dir_all(dir).map_err(PipelineError::io_at(dir))?;

    let next = fs::read_dir(dir)
        .map_err(PipelineError::io_at(dir))?
        .filter_map(std::result::Result::ok)
        .filter_map(|entry| entry.file_name().to_str().and_then(part_index))
        .max()
        .map_or(0, |last| last + 1);
    Ok(dir.join(format!("part-{next:05}.parquet")))
}

/// Write a table as one part file inside `dir`
///
/// The schema is passed separately so that an empty table still produces a
/// readable (zero-row) file.
pub fn write_table(
    dir: &Path,
    schema: SchemaRef,
    batches: &[RecordBatch],
    mode: WriteMode,
) -> Result<usize> {
    let start = std::time::Instant::now();
    log_operation_start("Writing table to", dir);

    let part = prepare_table_dir(dir, mode)?;
    write_parquet_file(&part, schema, batches)?;

    let rows = total_rows(batches);
    log_rows_transferred(Transfer::Write, dir, rows, Some(start.elapsed()));
    Ok(rows)
}

/// Write a table split into one sub-directory per value of `partition_column`
///
/// The partition column is carried by the directory name and removed from the
/// data files. Returns the number of rows written per partition value.
pub fn write_partitioned(
    dir: &Path,
    batches: &[RecordBatch],
    partition_column: &str,
    mode: WriteMode,
) -> Result<BTreeMap<String, usize>> {
    let start = std::time::Instant::now();
    log_operation_start("Writing partitioned table to", dir);

    if mode == WriteMode::Overwrite && dir.exists() {
        fs::remove_dir_all(dir).map_err(PipelineError::io_at(dir))?;
    }
    fs::create_dir_all(dir).map_err(PipelineError::io_at(dir))?;

    let mut partitions: BTreeMap<String, Vec<RecordBatch>> = BTreeMap::new();
    for batch in batches {
        for (value, part) in split_by_column(batch, partition_column)? {
            partitions.entry(value).or_default().push(part);
        }
    }

    partitions
        .par_iter()
        .map(|(value, parts)| {
            let part_dir = dir.join(format!("{partition_column}={value}"));
            let path = prepare_table_dir(&part_dir, WriteMode::Append)?;
            let schema = parts[0].schema();
            write_parquet_file(&path, schema, parts)
        })
        .collect::<Result<Vec<()>>>()?;

    let counts: BTreeMap<String, usize> = partitions
        .iter()
        .map(|(value, parts)| (value.clone(), total_rows(parts)))
        .collect();
    log_rows_transferred(
        Transfer::Write,
        dir,
        counts.values().sum(),
        Some(start.elapsed()),
    );
    log::info!("{} partitions written under {}", counts.len(), dir.display());
    Ok(counts)
}

/// Split a batch into per-value batches of `column`, with that column removed
fn split_by_column(batch: &RecordBatch, column: &str) -> Result<Vec<(String, RecordBatch)>> {
    let values = string_column(batch, column)?;

    let mut groups: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for (row, value) in values.iter().enumerate() {
        let key = value.map_or_else(|| NULL_PARTITION.to_string(), str::to_string);
        let row = u32::try_from(row)
            .map_err(|_| PipelineError::Schema("batch exceeds u32::MAX rows".into()))?;
        groups.entry(key).or_default().push(row);
    }

    let stripped = drop_columns(batch, &[column])?;
    groups
        .into_iter()
        .map(|(key, rows)| {
            let indices = UInt32Array::from(rows);
            Ok((key, take_record_batch(&stripped, &indices)?))
        })
        .collect()
}

/// A data file found while walking a table directory, with the partition
/// values taken from its parent directories
#[derive(Debug)]
struct TableFile {
    path: PathBuf,
    partitions: Vec<(String, Option<String>)>,
}

fn collect_table_files(
    dir: &Path,
    partitions: &[(String, Option<String>)],
    out: &mut Vec<TableFile>,
) -> Result<()> {
    let entries = fs::read_dir(dir)
        .map_err(PipelineError::io_at(dir))?
        .map(|entry| entry.map(|e| e.path()).map_err(PipelineError::io_at(dir)))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sorted();

    for path in entries {
        if path.is_dir() {
            let Some((key, value)) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| name.split_once('='))
            else {
                log_warning("Skipping non-partition directory", Some(&path));
                continue;
            };
            let value = (value != NULL_PARTITION).then(|| value.to_string());
            let mut nested = partitions.to_vec();
            nested.push((key.to_string(), value));
            collect_table_files(&path, &nested, out)?;
        } else if path.extension().is_some_and(|ext| ext == "parquet") {
            out.push(TableFile {
                path,
                partitions: partitions.to_vec(),
            });
        }
    }
    Ok(())
}

/// Type for a partition column: Int32 when every value is an integer, else Utf8
fn partition_type(files: &[TableFile], key: &str) -> DataType {
    let all_integers = files
        .iter()
        .flat_map(|file| &file.partitions)
        .filter(|(k, _)| k == key)
        .filter_map(|(_, value)| value.as_deref())
        .all(|value| value.parse::<i32>().is_ok());
    if all_integers {
        DataType::Int32
    } else {
        DataType::Utf8
    }
}

fn partition_array(value: Option<&str>, data_type: &DataType, rows: usize) -> Result<ArrayRef> {
    match value {
        None => Ok(new_null_array(data_type, rows)),
        Some(value) => {
            let strings: ArrayRef = Arc::new(StringArray::from(vec![value; rows]));
            Ok(cast(&strings, data_type)?)
        }
    }
}

/// Read a table written by [`write_table`] or [`write_partitioned`]
///
/// Partition columns are restored from the directory names and appended after
/// the data columns.
pub fn read_table(dir: &Path, batch_size: usize) -> Result<Vec<RecordBatch>> {
    validate_directory(dir)?;

    let mut files = Vec::new();
    collect_table_files(dir, &[], &mut files)?;
    if files.is_empty() {
        log_warning("No Parquet files found in table directory", Some(dir));
        return Ok(Vec::new());
    }

    let partition_types: Vec<(String, DataType)> = files
        .iter()
        .flat_map(|file| file.partitions.iter().map(|(key, _)| key.clone()))
        .unique()
        .map(|key| {
            let data_type = partition_type(&files, &key);
            (key, data_type)
        })
        .collect();

    let per_file = files
        .par_iter()
        .map(|file| {
            let batches = read_parquet(&file.path, batch_size)?;
            batches
                .into_iter()
                .map(|batch| with_partition_columns(batch, &file.partitions, &partition_types))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let batches = per_file.into_iter().flatten().collect_vec();
    log_rows_transferred(Transfer::Read, dir, total_rows(&batches), None);
    Ok(batches)
}

fn with_partition_columns(
    batch: RecordBatch,
    partitions: &[(String, Option<String>)],
    partition_types: &[(String, DataType)],
) -> Result<RecordBatch> {
    if partition_types.is_empty() {
        return Ok(batch);
    }

    let rows = batch.num_rows();
    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.as_ref().clone())
        .collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();

    for (key, data_type) in partition_types {
        let value = partitions
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref());
        fields.push(Field::new(key, data_type.clone(), true));
        columns.push(partition_array(value, data_type, rows)?);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &options,
    )?)
}
