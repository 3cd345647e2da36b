//! Shared utilities: Arrow helpers, Parquet IO and logging

pub mod arrow;
pub mod io;
pub mod logging;
