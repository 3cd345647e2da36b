//! Raw record readers
//!
//! Fact sources are conformed to the canonical 28-column raw schema on read;
//! the auxiliary files are read with fixed positional schemas.

pub mod auxiliary;
pub mod csv;
pub mod fact;

pub use auxiliary::{read_airports, read_demographics};
pub use csv::{CsvOptions, read_csv, read_csv_as_text};
pub use fact::{
    IngestReport, ingest_fact_sources, read_fact_source, read_staged_facts, resolve_fact_sources,
};
