//! Core data models for the shift ledger.
//!
//! This module contains the workers, shift records and payroll rows used
//! throughout the engine.

mod payroll_row;
mod shift_record;
mod worker;

pub use payroll_row::{PayrollQuery, PayrollRow};
pub use shift_record::{NewShift, ShiftClosing, ShiftId, ShiftRecord};
pub use worker::{NewWorker, Worker, WorkerId, normalize_phone};
