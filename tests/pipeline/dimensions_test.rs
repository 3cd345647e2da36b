use std::collections::HashSet;

use arrow::array::AsArray;
use i94_star::pipeline::{derive_airports, derive_demographics, transform_fact};
use i94_star::reader::{read_airports, read_demographics};
use i94_star::schema::fields::{airports, demographics};
use i94_star::utils::arrow::{string_column, total_rows};
use i94_star::{DEFAULT_BATCH_SIZE, RecordBatch};

use crate::utils::{
    AIRPORTS_CSV, DEMOGRAPHICS_CSV, RawDemographic, RawFact, raw_demographics_batch,
    raw_fact_batch, write_file,
};

fn pairs(batches: &[RecordBatch], left: &str, right: &str) -> HashSet<(String, String)> {
    batches
        .iter()
        .flat_map(|batch| {
            let l = string_column(batch, left).expect("left column");
            let r = string_column(batch, right).expect("right column");
            l.iter()
                .zip(r.iter())
                .map(|(a, b)| {
                    (
                        a.unwrap_or_default().to_string(),
                        b.unwrap_or_default().to_string(),
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn test_one_state_per_code_and_one_city_row_per_race() -> i94_star::Result<()> {
    let raw = raw_demographics_batch(&[
        RawDemographic::new("Atlanta", "Georgia", "GA", "White", 190_050),
        RawDemographic::new("Atlanta", "Georgia", "GA", "Asian", 19_502),
        RawDemographic::new("Atlanta", "Georgia", "GA", "Hispanic or Latino", 22_248),
        RawDemographic::new("Boston", "Massachusetts", "MA", "White", 364_041),
        RawDemographic::new("Boston", "Massachusetts", "MA", "Asian", 69_587),
    ]);

    let (cities, states) = derive_demographics(&[raw])?;

    assert_eq!(total_rows(&states), 2);
    assert_eq!(
        pairs(&states, demographics::CODE, demographics::NAME),
        HashSet::from([
            ("GA".to_string(), "Georgia".to_string()),
            ("MA".to_string(), "Massachusetts".to_string()),
        ])
    );

    assert_eq!(total_rows(&cities), 5);
    assert_eq!(pairs(&cities, demographics::CITY, demographics::RACE).len(), 5);
    let schema = cities[0].schema();
    assert!(schema.field_with_name(demographics::STATE_NAME).is_err());
    assert!(schema.field_with_name("Count").is_err());
    assert!(schema.field_with_name("count").is_err());
    Ok(())
}

#[test]
fn test_demographics_file_is_deduplicated() -> i94_star::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "demographics.csv", DEMOGRAPHICS_CSV);

    let raw = read_demographics(&path, DEFAULT_BATCH_SIZE)?;
    assert_eq!(total_rows(&raw), 6);

    let (cities, states) = derive_demographics(&raw)?;
    assert_eq!(total_rows(&cities), 5);
    assert_eq!(total_rows(&states), 2);
    Ok(())
}

#[test]
fn test_airports_limited_to_fact_destinations() -> i94_star::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(dir.path(), "airports.csv", AIRPORTS_CSV);
    let registry = read_airports(&path, DEFAULT_BATCH_SIZE)?;
    assert_eq!(total_rows(&registry), 3);

    let facts = transform_fact(&[raw_fact_batch(&[
        RawFact::arrival(1, "ATL", "GA", 4),
        RawFact::arrival(2, "BOS", "MA", 4),
        RawFact::arrival(3, "BOS", "MA", 4),
    ])])?;

    let out = derive_airports(&registry, &facts)?;
    assert_eq!(total_rows(&out), 2);

    let codes: HashSet<String> = out
        .iter()
        .flat_map(|batch| {
            batch
                .column_by_name(airports::IATA)
                .expect("iata column")
                .as_string::<i32>()
                .iter()
                .flatten()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(codes, HashSet::from(["ATL".to_string(), "BOS".to_string()]));

    let names = pairs(&out, airports::IATA, airports::NAME);
    assert!(names.contains(&(
        "BOS".to_string(),
        "General Edward Lawrence \"Logan\" International Airport".to_string()
    )));
    assert!(out[0].schema().field_with_name("icao").is_err());
    Ok(())
}
