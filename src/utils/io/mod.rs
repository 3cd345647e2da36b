//! IO utilities for reading and writing Parquet tables

pub mod parquet;

pub use parquet::{
    DEFAULT_BATCH_SIZE, WriteMode, find_files_with_extensions, read_parquet, read_table,
    validate_directory, write_partitioned, write_table,
};
