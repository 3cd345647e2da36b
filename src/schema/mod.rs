//! Schemas of the raw inputs and of the star-schema outputs.

pub mod adapt;
pub mod fields;

pub use adapt::{conform_batch, day_offset_to_date, is_match};
pub use fields::{
    AIRPORT_RENAMES, AIRPORTS_SCHEMA, CITY_DEMOGRAPHICS_SCHEMA, DEMOGRAPHIC_RENAMES,
    DROPPED_DEMOGRAPHIC_COLUMNS, DROPPED_FACT_COLUMNS, Derivation, FACT_COLUMNS, FACT_SCHEMA,
    FactColumn, RAW_AIRPORTS_SCHEMA, RAW_DEMOGRAPHICS_SCHEMA, RAW_FACT_SCHEMA,
    REQUIRED_FACT_COLUMNS, STATES_SCHEMA,
};
