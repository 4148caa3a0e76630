//! Request types for the shift ledger API.
//!
//! Times of day travel as `"HH:MM"` strings and are parsed here, so that a
//! malformed time is reported as a validation error naming the field.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::parse_time_of_day;
use crate::error::EngineResult;
use crate::ledger::{CloseSubmission, ShiftSubmission};
use crate::models::{PayrollQuery, WorkerId};
use crate::store::ShiftFilter;

/// Request body for `POST /workers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterWorkerRequest {
    /// Display name.
    pub name: String,
    /// Contact phone.
    pub phone: String,
}

/// Request body for `POST /shifts`.
///
/// The worker is identified by phone. When `name` is present and the phone
/// is unknown, the worker is registered first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftRequest {
    /// Contact phone of the worker.
    pub phone: String,
    /// Name used to register an unknown worker.
    #[serde(default)]
    pub name: Option<String>,
    /// Calendar date of the shift.
    pub date: NaiveDate,
    /// Clock-in time, `HH:MM`.
    pub entry_time: String,
    /// Clock-out time, `HH:MM`, when the whole shift is recorded at once.
    #[serde(default)]
    pub exit_time: Option<String>,
    /// Whether the car was used.
    #[serde(default)]
    pub car: Option<bool>,
    /// Explicit extra allowance.
    #[serde(default)]
    pub extra_allowance: Option<Decimal>,
}

impl ShiftRequest {
    /// Converts into a ledger submission for the resolved worker.
    pub fn into_submission(self, worker_id: WorkerId) -> EngineResult<ShiftSubmission> {
        let entry_time = parse_time_of_day("entry_time", &self.entry_time)?;
        let exit_time = self
            .exit_time
            .as_deref()
            .map(|exit| parse_time_of_day("exit_time", exit))
            .transpose()?;

        Ok(ShiftSubmission {
            worker_id,
            date: self.date,
            entry_time,
            exit_time,
            car: self.car,
            extra_allowance: self.extra_allowance,
        })
    }
}

/// Request body for `POST /shifts/close`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseShiftRequest {
    /// Contact phone of the worker.
    pub phone: String,
    /// Date of the open shift.
    pub date: NaiveDate,
    /// Clock-out time, `HH:MM`.
    pub exit_time: String,
    /// Whether the car was used.
    #[serde(default)]
    pub car: Option<bool>,
    /// Explicit extra allowance.
    #[serde(default)]
    pub extra_allowance: Option<Decimal>,
}

impl CloseShiftRequest {
    /// Converts into a ledger close for the resolved worker.
    pub fn into_submission(self, worker_id: WorkerId) -> EngineResult<CloseSubmission> {
        Ok(CloseSubmission {
            worker_id,
            date: self.date,
            exit_time: parse_time_of_day("exit_time", &self.exit_time)?,
            car: self.car,
            extra_allowance: self.extra_allowance,
        })
    }
}

/// Query string of `GET /shifts/open`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenShiftsQuery {
    /// Restrict to the worker with this phone.
    #[serde(default)]
    pub phone: Option<String>,
}

/// Query string of `GET /admin/shifts`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReviewQuery {
    /// Restrict to one worker.
    #[serde(default)]
    pub worker_id: Option<i64>,
    /// Restrict to a calendar year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Restrict to a month; requires `year`.
    #[serde(default)]
    pub month: Option<u32>,
    /// Only shifts still waiting for an exit time.
    #[serde(default)]
    pub open_only: bool,
}

impl ReviewQuery {
    /// Validates and converts into a store filter.
    pub fn into_filter(self) -> EngineResult<ShiftFilter> {
        let period = PayrollQuery {
            worker_id: self.worker_id.map(WorkerId),
            year: self.year,
            month: self.month,
        };
        period.validate()?;

        Ok(ShiftFilter {
            open_only: self.open_only,
            ..ShiftFilter::from(&period)
        })
    }
}

/// Query string of `GET /admin/payroll`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PayrollRequest {
    /// Restrict to one worker.
    #[serde(default)]
    pub worker_id: Option<i64>,
    /// Restrict to a calendar year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Restrict to a month; requires `year`.
    #[serde(default)]
    pub month: Option<u32>,
}

impl From<PayrollRequest> for PayrollQuery {
    fn from(req: PayrollRequest) -> Self {
        PayrollQuery {
            worker_id: req.worker_id.map(WorkerId),
            year: req.year,
            month: req.month,
        }
    }
}

/// Request body for `PUT /admin/shifts/{id}/allowance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceRequest {
    /// The new extra allowance.
    pub extra_allowance: Decimal,
}
