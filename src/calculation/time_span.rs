//! Time span calculation.
//!
//! Shifts are recorded as two times of day on a single calendar date. This
//! module turns such a pair into worked hours, treating an exit earlier than
//! the entry as a shift that crossed midnight.

use chrono::{NaiveTime, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Number of decimal places used when hours or money are presented.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Calculates the hours elapsed between an entry and an exit time of day.
///
/// If the exit is earlier than the entry the shift is taken to have crossed
/// midnight once and 24 hours are added. An exit equal to the entry yields
/// zero hours. The result is exact and unrounded; round only for display with
/// [`round_for_display`].
///
/// # Examples
///
/// ```
/// use shift_ledger::calculation::elapsed_hours;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let entry = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
/// let exit = NaiveTime::from_hms_opt(17, 30, 0).unwrap();
/// assert_eq!(elapsed_hours(entry, exit), Decimal::new(85, 1));
///
/// // 22:00 to 06:00 crosses midnight
/// let entry = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
/// let exit = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
/// assert_eq!(elapsed_hours(entry, exit), Decimal::new(8, 0));
/// ```
pub fn elapsed_hours(entry: NaiveTime, exit: NaiveTime) -> Decimal {
    let mut seconds = i64::from(exit.num_seconds_from_midnight())
        - i64::from(entry.num_seconds_from_midnight());

    if seconds < 0 {
        seconds += SECONDS_PER_DAY;
    }

    Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)
}

/// Rounds an amount to [`DISPLAY_DECIMAL_PLACES`] with half-away-from-zero.
///
/// The result always carries exactly two decimal places, so `5` renders as
/// `5.00`.
pub fn round_for_display(amount: Decimal) -> Decimal {
    let mut rounded = amount
        .round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(DISPLAY_DECIMAL_PLACES);
    rounded
}

/// Parses a time of day given as `HH:MM` or `HH:MM:SS`.
///
/// # Examples
///
/// ```
/// use shift_ledger::calculation::parse_time_of_day;
/// use chrono::NaiveTime;
///
/// assert_eq!(
///     parse_time_of_day("entry_time", "09:05").unwrap(),
///     NaiveTime::from_hms_opt(9, 5, 0).unwrap()
/// );
/// assert!(parse_time_of_day("entry_time", "25:00").is_err());
/// ```
pub fn parse_time_of_day(field: &str, value: &str) -> EngineResult<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| {
            EngineError::validation(
                field,
                format!("'{}' is not a time of day (expected HH:MM)", value),
            )
        })
}

/// Formats a time of day as `HH:MM`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
