//! Arrow helpers shared by the pipeline stages

pub mod array_utils;

pub use array_utils::{
    column_by_name, distinct_codes, drop_columns, select_renamed, string_column, total_rows,
    utf8_array,
};
