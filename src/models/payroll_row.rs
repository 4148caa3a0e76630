//! Payroll row and payroll query models.
//!
//! Payroll rows are derived data: they are recomputed from the shift records
//! on every query and never stored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::worker::WorkerId;

/// Filter for a payroll computation.
///
/// Every field is optional; an empty query covers every worker and every
/// month on record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollQuery {
    /// Restrict to a single worker.
    #[serde(default)]
    pub worker_id: Option<WorkerId>,
    /// Restrict to a calendar year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Restrict to a month (1-12) of `year`.
    #[serde(default)]
    pub month: Option<u32>,
}

impl PayrollQuery {
    /// Checks that the period is well formed.
    ///
    /// A month needs a year and must be within 1..=12.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_ledger::models::PayrollQuery;
    ///
    /// let query = PayrollQuery { worker_id: None, year: Some(2024), month: Some(5) };
    /// assert!(query.validate().is_ok());
    ///
    /// let query = PayrollQuery { worker_id: None, year: None, month: Some(5) };
    /// assert!(query.validate().is_err());
    /// ```
    pub fn validate(&self) -> EngineResult<()> {
        if let Some(month) = self.month {
            if self.year.is_none() {
                return Err(EngineError::validation("month", "requires a year"));
            }
            if !(1..=12).contains(&month) {
                return Err(EngineError::validation(
                    "month",
                    format!("{} is not a month number", month),
                ));
            }
        }
        Ok(())
    }

    /// Returns true if the query names a year or month.
    pub fn has_period(&self) -> bool {
        self.year.is_some() || self.month.is_some()
    }
}

/// Payroll aggregate for one worker over one period.
///
/// Without an explicit period there is one row per worker and calendar
/// month. With an explicit year or month there is one row per worker, and
/// the row carries the queried period (`month` is `None` for a whole year).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRow {
    /// The worker.
    pub worker_id: WorkerId,
    /// The worker's display name.
    pub worker_name: String,
    /// Calendar year of the period.
    pub year: Option<i32>,
    /// Month (1-12) of the period; `None` when the period is a whole year.
    pub month: Option<u32>,
    /// Number of closed shifts in the period.
    pub shift_count: u32,
    /// Sum of worked hours, unrounded.
    pub total_hours: Decimal,
    /// `total_hours` multiplied by the hourly rate, unrounded.
    pub hourly_pay: Decimal,
    /// Sum of the extra allowances.
    pub total_extra_allowance: Decimal,
    /// `hourly_pay + total_extra_allowance`.
    pub total_pay: Decimal,
}

impl PayrollRow {
    /// Returns a copy with monetary and hour amounts rounded for display.
    pub fn rounded(&self) -> Self {
        use crate::calculation::round_for_display;

        Self {
            total_hours: round_for_display(self.total_hours),
            hourly_pay: round_for_display(self.hourly_pay),
            total_extra_allowance: round_for_display(self.total_extra_allowance),
            total_pay: round_for_display(self.total_pay),
            worker_name: self.worker_name.clone(),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_empty_query_is_valid() {
        assert!(PayrollQuery::default().validate().is_ok());
    }

    #[test]
    fn test_month_out_of_range_is_rejected() {
        let query = PayrollQuery {
            worker_id: None,
            year: Some(2024),
            month: Some(13),
        };
        assert!(matches!(
            query.validate(),
            Err(EngineError::Validation { ref field, .. }) if field == "month"
        ));
    }

    #[test]
    fn test_rounded_keeps_identity_fields() {
        let row = PayrollRow {
            worker_id: WorkerId(3),
            worker_name: "Ana".to_string(),
            year: Some(2024),
            month: Some(5),
            shift_count: 1,
            total_hours: Decimal::from_str("8.3333333333").unwrap(),
            hourly_pay: Decimal::from_str("75.0000000").unwrap(),
            total_extra_allowance: Decimal::from_str("5").unwrap(),
            total_pay: Decimal::from_str("80.0000000").unwrap(),
        };

        let rounded = row.rounded();
        assert_eq!(rounded.worker_id, WorkerId(3));
        assert_eq!(rounded.worker_name, "Ana");
        assert_eq!(rounded.total_hours.to_string(), "8.33");
        assert_eq!(rounded.total_pay.to_string(), "80.00");
    }
}
