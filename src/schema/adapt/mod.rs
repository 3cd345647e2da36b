//! Type adaptation: conforming sources to canonical schemas and deriving
//! typed columns from raw values.

pub mod conform;
pub mod conversions;
pub mod date_utils;

pub use conform::conform_batch;
pub use conversions::{
    MATCH_FLAG_MATCHED, cast_lenient, day_offsets_to_dates, is_match, match_flags,
    normalize_codes,
};
pub use date_utils::{OFFSET_EPOCH, day_offset_to_date, offset_days_to_date, to_date32};
