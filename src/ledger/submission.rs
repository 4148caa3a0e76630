//! Inputs and outputs of ledger operations.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{ShiftRecord, Worker, WorkerId};
use crate::notify::{DeliveryResult, ShiftEvent};

/// A clock-in, optionally with an immediate clock-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSubmission {
    /// The worker submitting the shift.
    pub worker_id: WorkerId,
    /// Calendar date of the shift.
    pub date: NaiveDate,
    /// Clock-in time.
    pub entry_time: NaiveTime,
    /// Clock-out time, when the shift is recorded in one go.
    pub exit_time: Option<NaiveTime>,
    /// Whether the car was used; `None` leaves the default (or stored) flag.
    pub car: Option<bool>,
    /// Explicit extra allowance; `None` lets the car default apply.
    pub extra_allowance: Option<Decimal>,
}

/// A clock-out for a previously opened shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseSubmission {
    /// The worker closing the shift.
    pub worker_id: WorkerId,
    /// Calendar date of the open shift.
    pub date: NaiveDate,
    /// Clock-out time.
    pub exit_time: NaiveTime,
    /// Whether the car was used; `None` keeps the stored flag.
    pub car: Option<bool>,
    /// Explicit extra allowance; `None` lets the car default apply.
    pub extra_allowance: Option<Decimal>,
}

/// Result of a ledger write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerOutcome {
    /// The record as stored after the write.
    pub record: ShiftRecord,
    /// The event the write produced.
    pub event: ShiftEvent,
    /// What happened to the notification. Informational only.
    pub delivery: DeliveryResult,
}

/// A shift joined with its worker, for administrative review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEntry {
    /// The shift.
    pub shift: ShiftRecord,
    /// The worker the shift belongs to.
    pub worker: Worker,
    /// Worked hours, unrounded; `None` while open.
    pub hours: Option<Decimal>,
}
