//! Day-offset date handling.
//!
//! Source dates are stored as a number of days since 1960-01-01. Conversion is
//! pure and never fails: anything that is not a usable offset maps to `None`.

use chrono::{Days, NaiveDate};

/// Epoch of the source day offsets
pub const OFFSET_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1960, 1, 1) {
    Some(date) => date,
    None => panic!("invalid offset epoch"),
};

/// Epoch of Arrow's `Date32` (days since 1970-01-01)
pub const UNIX_EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(1970, 1, 1) {
    Some(date) => date,
    None => panic!("invalid unix epoch"),
};

/// Convert a numeric day offset to a calendar date, keeping whole days only
#[must_use]
pub fn offset_days_to_date(offset: f64) -> Option<NaiveDate> {
    if !offset.is_finite() {
        return None;
    }
    let whole = offset.trunc();
    if whole.abs() > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let days = Days::new(whole.abs() as u64);
    if whole >= 0.0 {
        OFFSET_EPOCH.checked_add_days(days)
    } else {
        OFFSET_EPOCH.checked_sub_days(days)
    }
}

/// Parse a raw day-offset value and convert it to a calendar date
///
/// # Examples
/// ```
/// use i94_star::schema::adapt::date_utils::day_offset_to_date;
/// use chrono::NaiveDate;
///
/// assert_eq!(day_offset_to_date("0"), NaiveDate::from_ymd_opt(1960, 1, 1));
/// assert_eq!(day_offset_to_date("20545.0"), NaiveDate::from_ymd_opt(2016, 4, 1));
/// assert_eq!(day_offset_to_date("n/a"), None);
/// ```
#[must_use]
pub fn day_offset_to_date(raw: &str) -> Option<NaiveDate> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(offset_days_to_date)
}

/// Days since the Unix epoch, as stored in an Arrow `Date32` array
#[must_use]
pub fn to_date32(date: NaiveDate) -> Option<i32> {
    i32::try_from(date.signed_duration_since(UNIX_EPOCH).num_days()).ok()
}
