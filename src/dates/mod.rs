//! Date primitives and validation predicates shared by all calculators.
//!
//! The crate operates at calendar-day granularity. Dates are carried as
//! [`NaiveDateTime`] values pinned to midnight, constructed with [`ndt`].

use chrono::prelude::*;

use crate::errors::CalendarError;

/// Inclusive year range over which calendar computations are defined.
///
/// The lower bound is the Gregorian reform (the computus is meaningless
/// before it); the upper bound matches the validity window of the
/// closed-form Easter algorithm.
pub const MIN_YEAR: i32 = 1583;
/// Upper bound of [`MIN_YEAR`]..=[`MAX_YEAR`].
pub const MAX_YEAR: i32 = 4099;

/// Create a `NaiveDateTime` with default null time.
///
/// Panics if date values are invalid.
pub fn ndt(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("`year`, `month` `day` are invalid.")
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Fallible counterpart of [`ndt`].
pub fn ndt_opt(year: i32, month: u32, day: u32) -> Result<NaiveDateTime, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.and_hms_opt(0, 0, 0).unwrap())
        .ok_or_else(|| {
            CalendarError::InvalidDate(format!("{}-{:02}-{:02} does not exist", year, month, day))
        })
}

/// Number of days in a Gregorian month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    // the day before the first of the next month
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
        .day()
}

/// Returns whether `(year, month, day)` names an existing calendar date.
pub fn is_valid_date(year: i32, month: u32, day: u32) -> bool {
    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

/// Returns whether `year` lies in the supported computation range.
pub fn is_valid_year(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

/// Returns whether `weekday` is a valid day index (0=Mon, .., 6=Sun).
pub fn is_valid_weekday(weekday: u8) -> bool {
    weekday <= 6
}

/// Returns whether `nth` is a usable ordinal for an nth-weekday rule.
///
/// Positive values count from the start of the month, negative from the
/// end; zero is meaningless and no weekday occurs more than five times.
pub fn is_valid_nth(nth: i8) -> bool {
    nth != 0 && (-5..=5).contains(&nth)
}

/// Returns whether `locale` is a well-formed locale tag.
///
/// Tags are non-empty lowercase ASCII (`"us"`, `"de-by"`) or the wildcard
/// `"*"` which scopes a rule to every locale.
pub fn is_valid_locale(locale: &str) -> bool {
    locale == "*"
        || (!locale.is_empty()
            && locale
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'))
}

/// The nth occurrence of `weekday` within a month, or `None` when the month
/// has no such occurrence.
///
/// `nth` counts from the start of the month when positive and from the end
/// when negative; it must not be zero.
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    weekday: Weekday,
    nth: i8,
) -> Option<NaiveDateTime> {
    let days = days_in_month(year, month);
    let target = weekday.num_days_from_monday();
    let day: i32 = if nth > 0 {
        let w1 = ndt(year, month, 1).weekday().num_days_from_monday();
        let first = 1 + (target + 7 - w1) % 7;
        first as i32 + 7 * (nth as i32 - 1)
    } else {
        let wl = ndt(year, month, days).weekday().num_days_from_monday();
        let last = days - (wl + 7 - target) % 7;
        last as i32 - 7 * (-nth as i32 - 1)
    };
    if day < 1 || day as u32 > days {
        None
    } else {
        Some(ndt(year, month, day as u32))
    }
}
