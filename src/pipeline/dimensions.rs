//! Dimension tables derived from the auxiliary files and the cleaned facts.

use std::sync::Arc;

use arrow::datatypes::SchemaRef;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::filter::{BatchFilter, CodeSetFilter, distinct_batches};
use crate::schema::fields::{demographics, fact, raw_airports};
use crate::schema::{
    AIRPORT_RENAMES, AIRPORTS_SCHEMA, CITY_DEMOGRAPHICS_SCHEMA, DEMOGRAPHIC_RENAMES,
    DROPPED_DEMOGRAPHIC_COLUMNS, STATES_SCHEMA,
};
use crate::utils::arrow::{distinct_codes, drop_columns, select_renamed, total_rows};

/// The three dimension tables of the star schema
#[derive(Debug, Clone)]
pub struct Dimensions {
    pub city_demographics: Vec<RecordBatch>,
    pub states: Vec<RecordBatch>,
    pub airports: Vec<RecordBatch>,
}

impl Dimensions {
    /// Output schemas, in the order `city_demographics`, `states`, `airports`
    #[must_use]
    pub fn schemas() -> [SchemaRef; 3] {
        [
            CITY_DEMOGRAPHICS_SCHEMA.clone(),
            STATES_SCHEMA.clone(),
            AIRPORTS_SCHEMA.clone(),
        ]
    }
}

fn map_batches<F>(batches: &[RecordBatch], f: F) -> Result<Vec<RecordBatch>>
where
    F: Fn(&RecordBatch) -> Result<RecordBatch>,
{
    batches.iter().map(f).collect()
}

/// Split raw demographics into the city table and the state table
///
/// States are projected before the state name leaves the city table, and both
/// tables are deduplicated exactly.
pub fn derive_demographics(raw: &[RecordBatch]) -> Result<(Vec<RecordBatch>, Vec<RecordBatch>)> {
    let renamed = map_batches(raw, |batch| {
        let kept = drop_columns(batch, &DROPPED_DEMOGRAPHIC_COLUMNS)?;
        select_renamed(&kept, &DEMOGRAPHIC_RENAMES)
    })?;
    let renamed = distinct_batches(&renamed)?;

    let states = map_batches(&renamed, |batch| {
        select_renamed(
            batch,
            &[
                (demographics::STATE_CODE, demographics::CODE),
                (demographics::STATE_NAME, demographics::NAME),
            ],
        )
    })?;
    let states = distinct_batches(&states)?;

    let cities = map_batches(&renamed, |batch| {
        drop_columns(batch, &[demographics::STATE_NAME])
    })?;
    let cities = distinct_batches(&cities)?;

    log::info!(
        "Derived {} city demographic rows and {} state rows",
        total_rows(&cities),
        total_rows(&states)
    );
    Ok((cities, states))
}

/// Keep registry airports whose IATA code is a destination in the fact table
pub fn derive_airports(raw: &[RecordBatch], facts: &[RecordBatch]) -> Result<Vec<RecordBatch>> {
    let destinations = Arc::new(distinct_codes(facts, fact::DESTINATION_CODE)?);
    let used = CodeSetFilter::new(raw_airports::IATA, destinations);

    let airports = map_batches(raw, |batch| {
        let matched = used.filter(batch)?;
        select_renamed(&matched, &AIRPORT_RENAMES)
    })?;
    let airports = distinct_batches(&airports)?;

    log::info!(
        "Derived {} airport rows from {} registry rows",
        total_rows(&airports),
        total_rows(raw)
    );
    Ok(airports)
}

/// Derive all three dimension tables
pub fn derive_dimensions(
    demographics: &[RecordBatch],
    airports: &[RecordBatch],
    facts: &[RecordBatch],
) -> Result<Dimensions> {
    let (city_demographics, states) = derive_demographics(demographics)?;
    let airports = derive_airports(airports, facts)?;
    Ok(Dimensions {
        city_demographics,
        states,
        airports,
    })
}
