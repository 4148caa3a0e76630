//! Calculation logic for the shift ledger.
//!
//! This module contains the pure computations of the engine: turning an
//! entry/exit pair into worked hours (with midnight wraparound), parsing and
//! presenting times of day, and folding closed shifts into payroll rows.

mod payroll;
mod time_span;

pub use payroll::{compute_payroll, matches_query};
pub use time_span::{
    DISPLAY_DECIMAL_PLACES, elapsed_hours, format_time_of_day, parse_time_of_day,
    round_for_display,
};
