//! Shift record model and the write payloads accepted by the store.
//!
//! A [`ShiftRecord`] is one workday of one worker. It is *open* while its
//! exit time is absent and *closed* once the exit time is recorded.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::elapsed_hours;

use super::worker::WorkerId;

/// Store-assigned identifier of a shift record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShiftId(pub i64);

impl std::fmt::Display for ShiftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// Unique identifier of the shift.
    pub id: ShiftId,
    /// The worker the shift belongs to.
    pub worker_id: WorkerId,
    /// Calendar date of the shift. Together with `worker_id` this is unique.
    pub date: NaiveDate,
    /// Clock-in time of day.
    pub entry_time: NaiveTime,
    /// Clock-out time of day, absent while the shift is open.
    pub exit_time: Option<NaiveTime>,
    /// Whether the worker used their car during the shift.
    pub car: bool,
    /// Extra allowance paid on top of the hourly wage.
    pub extra_allowance: Decimal,
}

impl ShiftRecord {
    /// Returns true while no exit time has been recorded.
    pub fn is_open(&self) -> bool {
        self.exit_time.is_none()
    }

    /// Worked hours of a closed shift, or `None` while the shift is open.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_ledger::models::{ShiftId, ShiftRecord, WorkerId};
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let shift = ShiftRecord {
    ///     id: ShiftId(1),
    ///     worker_id: WorkerId(1),
    ///     date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
    ///     entry_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
    ///     exit_time: NaiveTime::from_hms_opt(6, 0, 0),
    ///     car: false,
    ///     extra_allowance: Decimal::ZERO,
    /// };
    /// assert_eq!(shift.worked_hours(), Some(Decimal::new(8, 0)));
    /// ```
    pub fn worked_hours(&self) -> Option<Decimal> {
        self.exit_time
            .map(|exit| elapsed_hours(self.entry_time, exit))
    }
}

/// Payload for creating a shift record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShift {
    /// The worker the shift belongs to.
    pub worker_id: WorkerId,
    /// Calendar date of the shift.
    pub date: NaiveDate,
    /// Clock-in time of day.
    pub entry_time: NaiveTime,
    /// Clock-out time of day for an immediate clock-out.
    pub exit_time: Option<NaiveTime>,
    /// Whether the worker used their car.
    pub car: bool,
    /// Extra allowance for the shift.
    pub extra_allowance: Decimal,
}

/// Payload for closing an open shift.
///
/// `None` fields keep whatever the open record already holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftClosing {
    /// Clock-out time of day.
    pub exit_time: NaiveTime,
    /// New car flag, if supplied.
    pub car: Option<bool>,
    /// New extra allowance, if supplied.
    pub extra_allowance: Option<Decimal>,
}

impl ShiftClosing {
    /// Applies the closing to an open record.
    pub fn apply_to(&self, record: &mut ShiftRecord) {
        record.exit_time = Some(self.exit_time);
        if let Some(car) = self.car {
            record.car = car;
        }
        if let Some(amount) = self.extra_allowance {
            record.extra_allowance = amount;
        }
    }
}
