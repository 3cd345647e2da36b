//! Utilities for logging and progress tracking

pub mod log;
pub mod progress;

pub use log::{Transfer, log_operation_start, log_row_counts, log_rows_transferred, log_warning};
pub use progress::{create_main_progress_bar, finish_progress_bar};
