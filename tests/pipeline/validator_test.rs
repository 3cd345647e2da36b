use std::collections::HashSet;

use arrow::array::{Array, AsArray};
use arrow::datatypes::Float64Type;
use i94_star::filter::{BatchFilter, ExcludedCodesFilter, VocabularyFilter};
use i94_star::schema::fields::raw;
use i94_star::utils::arrow::{string_column, total_rows};
use i94_star::{RecordBatch, Validator};

use crate::utils::{RawFact, raw_fact_batch, ten_arrivals, vocabulary};

fn validator() -> Validator {
    Validator::new(vocabulary(), "99")
}

#[test]
fn test_nulls_and_duplicates_removed() -> i94_star::Result<()> {
    let batch = raw_fact_batch(&ten_arrivals());
    let (cleaned, report) = validator().clean(vec![batch])?;

    assert_eq!(total_rows(&cleaned), 7);
    assert_eq!(report.input_rows, 10);
    assert_eq!(report.after_required_fields, 8);
    assert_eq!(report.after_deduplication, 7);
    assert_eq!(report.after_vocabulary, 7);
    assert_eq!(report.after_state_sentinel, 7);
    assert_eq!(report.removed(), 3);
    Ok(())
}

#[test]
fn test_unknown_ports_and_sentinel_states_removed() -> i94_star::Result<()> {
    let rows = vec![
        RawFact::arrival(1, "ATL", "GA", 4),
        RawFact::arrival(2, "XXX", "GA", 4),
        RawFact::arrival(3, "BOS", "99", 4),
        RawFact::arrival(4, " BOS ", "MA", 4),
        RawFact::arrival(5, "NYC", "99.0", 4),
    ];
    let (cleaned, report) = validator().clean(vec![raw_fact_batch(&rows)])?;

    assert_eq!(report.after_vocabulary, 4);
    assert_eq!(report.after_state_sentinel, 2);

    let vocab = vocabulary();
    for batch in &cleaned {
        let ports = string_column(batch, raw::I94PORT)?;
        let states = string_column(batch, raw::I94ADDR)?;
        for (port, state) in ports.iter().zip(states.iter()) {
            assert!(port.is_some_and(|p| vocab.contains(p)));
            assert_ne!(state, Some("99"));
        }
    }
    Ok(())
}

#[test]
fn test_duplicates_removed_across_batches() -> i94_star::Result<()> {
    let first = raw_fact_batch(&[
        RawFact::arrival(1, "ATL", "GA", 4),
        RawFact::arrival(2, "BOS", "MA", 4),
    ]);
    let second = raw_fact_batch(&[
        RawFact::arrival(2, "BOS", "MA", 4),
        RawFact::arrival(3, "BOS", "MA", 4),
    ]);
    let (cleaned, report) = validator().clean(vec![first, second])?;

    assert_eq!(report.after_deduplication, 3);

    let ids: HashSet<i64> = cleaned
        .iter()
        .flat_map(|batch| {
            let ids = batch
                .column_by_name(raw::CICID)
                .expect("cicid column")
                .as_primitive::<Float64Type>()
                .clone();
            ids.iter().flatten().map(|id| id as i64).collect::<Vec<_>>()
        })
        .collect();
    assert_eq!(ids, HashSet::from([1, 2, 3]));
    Ok(())
}

#[test]
fn test_null_state_is_not_the_sentinel() -> i94_star::Result<()> {
    let mut row = RawFact::arrival(1, "ATL", "GA", 4);
    row.i94addr = None;
    let batch: RecordBatch = raw_fact_batch(&[row]);

    // Required-field check drops it, but the sentinel filter alone keeps it
    let kept = ExcludedCodesFilter::new(raw::I94ADDR, ["99"]).filter(&batch)?;
    assert_eq!(kept.num_rows(), 1);
    let (cleaned, _) = validator().clean(vec![batch])?;
    assert_eq!(total_rows(&cleaned), 0);
    Ok(())
}

#[test]
fn test_vocabulary_filter_drops_null_codes() -> i94_star::Result<()> {
    let batch = raw_fact_batch(&[RawFact::arrival(1, "ATL", "GA", 4).without_port()]);
    let kept = VocabularyFilter::new(raw::I94PORT, vocabulary()).filter(&batch)?;
    assert_eq!(kept.num_rows(), 0);
    assert_eq!(kept.column(0).len(), 0);
    Ok(())
}
