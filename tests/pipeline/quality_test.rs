use std::path::{Path, PathBuf};

use i94_star::pipeline::{Dimensions, derive_dimensions, transform_fact};
use i94_star::reader::{read_airports, read_demographics};
use i94_star::schema::fields::{fact, tables};
use i94_star::utils::io::{write_partitioned, write_table};
use i94_star::{
    DEFAULT_BATCH_SIZE, PipelineError, QualityGate, QualityViolation, RecordBatch, WriteMode,
};

use crate::utils::{AIRPORTS_CSV, DEMOGRAPHICS_CSV, RawFact, raw_fact_batch, write_file};

fn write_star(root: &Path, facts: &[RecordBatch]) -> i94_star::Result<PathBuf> {
    let output = root.join("output");
    let demographics_path = write_file(root, "demographics.csv", DEMOGRAPHICS_CSV);
    let airports_path = write_file(root, "airports.csv", AIRPORTS_CSV);
    let dimensions = derive_dimensions(
        &read_demographics(&demographics_path, DEFAULT_BATCH_SIZE)?,
        &read_airports(&airports_path, DEFAULT_BATCH_SIZE)?,
        facts,
    )?;

    write_partitioned(
        &output.join(tables::IMMIGRATION),
        facts,
        fact::MONTH,
        WriteMode::Overwrite,
    )?;
    let [city_schema, states_schema, airports_schema] = Dimensions::schemas();
    for (table, schema, batches) in [
        (tables::CITY_DEMOGRAPHICS, city_schema, &dimensions.city_demographics),
        (tables::STATES, states_schema, &dimensions.states),
        (tables::AIRPORTS, airports_schema, &dimensions.airports),
    ] {
        write_table(&output.join(table), schema, batches, WriteMode::Overwrite)?;
    }
    Ok(output)
}

#[test]
fn test_gate_passes_on_shared_keys() -> i94_star::Result<()> {
    let dir = tempfile::tempdir()?;
    let facts = transform_fact(&[raw_fact_batch(&[
        RawFact::arrival(1, "ATL", "GA", 4),
        RawFact::arrival(2, "BOS", "MA", 5),
    ])])?;
    let output = write_star(dir.path(), &facts)?;

    let report = QualityGate::new(&output, DEFAULT_BATCH_SIZE).run()?;
    assert_eq!(report.table_rows.get(tables::IMMIGRATION), Some(&2));
    assert_eq!(report.table_rows.get(tables::STATES), Some(&2));
    assert_eq!(report.table_rows.get(tables::AIRPORTS), Some(&2));
    Ok(())
}

#[test]
fn test_gate_reports_every_failed_relationship() -> i94_star::Result<()> {
    let dir = tempfile::tempdir()?;
    // No destination in the registry and no state in the demographics
    let facts = transform_fact(&[raw_fact_batch(&[RawFact::arrival(1, "NYC", "NY", 4)])])?;
    let output = write_star(dir.path(), &facts)?;

    let violations = match QualityGate::new(&output, DEFAULT_BATCH_SIZE).run() {
        Err(PipelineError::Quality(violations)) => violations,
        other => panic!("expected a quality failure, got {other:?}"),
    };

    assert!(violations.contains(&QualityViolation::EmptyTable {
        table: tables::AIRPORTS.to_string()
    }));
    let unshared: Vec<&str> = violations
        .iter()
        .filter_map(|violation| match violation {
            QualityViolation::NoSharedKeys { dimension, .. } => Some(dimension.as_str()),
            QualityViolation::EmptyTable { .. } => None,
        })
        .collect();
    assert_eq!(
        unshared,
        vec![tables::AIRPORTS, tables::STATES, tables::CITY_DEMOGRAPHICS]
    );
    Ok(())
}
