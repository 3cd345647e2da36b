//! Column-level derivations for the fact table.
//!
//! Each function lifts one of the pure row functions over an Arrow array.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Date32Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;

use crate::error::Result;
use crate::schema::adapt::date_utils::{day_offset_to_date, to_date32};
use crate::utils::arrow::utf8_array;
use crate::vocabulary::normalize_code;

/// Raw value of the match flag meaning "arrival and departure matched"
pub const MATCH_FLAG_MATCHED: &str = "M";

/// Whether a raw match flag marks a matched record; absent values are unmatched
#[must_use]
pub fn is_match(raw: Option<&str>) -> bool {
    raw == Some(MATCH_FLAG_MATCHED)
}

/// Convert raw day offsets to a `Date32` array; unusable offsets become null
pub fn day_offsets_to_dates(array: &ArrayRef) -> Result<ArrayRef> {
    let raw = utf8_array(array)?;
    let dates: Date32Array = raw
        .iter()
        .map(|value| value.and_then(day_offset_to_date).and_then(to_date32))
        .collect();
    Ok(Arc::new(dates))
}

/// Convert raw match flags to a non-null boolean array
pub fn match_flags(array: &ArrayRef) -> Result<ArrayRef> {
    let raw = utf8_array(array)?;
    let flags: BooleanArray = raw.iter().map(|value| Some(is_match(value))).collect();
    Ok(Arc::new(flags))
}

/// Normalize a code column (trimmed, numeric-as-string collapsed)
pub fn normalize_codes(array: &ArrayRef) -> Result<ArrayRef> {
    let raw = utf8_array(array)?;
    let codes: StringArray = raw
        .iter()
        .map(|value| value.map(|code| normalize_code(code).into_owned()))
        .collect();
    Ok(Arc::new(codes))
}

/// Cast to `target`; values that cannot be represented become null
pub fn cast_lenient(array: &ArrayRef, target: &DataType) -> Result<ArrayRef> {
    if array.data_type() == target {
        return Ok(Arc::clone(array));
    }
    Ok(cast(array, target)?)
}
