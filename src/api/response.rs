//! Response types for the shift ledger API.
//!
//! This module defines the JSON bodies returned by the handlers and the
//! mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::{format_time_of_day, round_for_display};
use crate::error::EngineError;
use crate::ledger::{LedgerOutcome, ReviewEntry};
use crate::models::{ShiftId, ShiftRecord, WorkerId};
use crate::notify::{DeliveryResult, ShiftEvent};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response for a request that could not be decoded.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(self.error),
        )
            .into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::DuplicateShift { still_open, .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "DUPLICATE_SHIFT",
                    message,
                    if still_open {
                        "Close the open shift instead of submitting a new one"
                    } else {
                        "Only one shift per worker and day is recorded"
                    },
                ),
            ),
            EngineError::WorkerAlreadyRegistered { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("WORKER_ALREADY_REGISTERED", message),
            ),
            EngineError::WorkerNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("WORKER_NOT_FOUND", message),
            ),
            EngineError::ShiftNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("SHIFT_NOT_FOUND", message),
            ),
            EngineError::ShiftAlreadyClosed { .. } => (
                StatusCode::CONFLICT,
                ApiError::new("SHIFT_ALREADY_CLOSED", message),
            ),
            EngineError::Validation { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    format!("Check the value of '{}'", field),
                ),
            ),
            EngineError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ApiError::new("UNAUTHORIZED", message),
            ),
            EngineError::Storage(_) | EngineError::StoreUnavailable { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage failure", message),
            ),
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

/// A shift as presented to API clients.
///
/// Times are `HH:MM`; hours and allowance are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftView {
    /// Shift id.
    pub id: ShiftId,
    /// Owning worker.
    pub worker_id: WorkerId,
    /// Calendar date.
    pub date: NaiveDate,
    /// Clock-in time.
    pub entry_time: String,
    /// Clock-out time; absent while open.
    pub exit_time: Option<String>,
    /// Whether the car was used.
    pub car: bool,
    /// Extra allowance.
    pub extra_allowance: Decimal,
    /// Worked hours; absent while open.
    pub hours: Option<Decimal>,
}

impl From<&ShiftRecord> for ShiftView {
    fn from(record: &ShiftRecord) -> Self {
        Self {
            id: record.id,
            worker_id: record.worker_id,
            date: record.date,
            entry_time: format_time_of_day(record.entry_time),
            exit_time: record.exit_time.map(format_time_of_day),
            car: record.car,
            extra_allowance: round_for_display(record.extra_allowance),
            hours: record.worked_hours().map(round_for_display),
        }
    }
}

/// Notification outcome reported with a ledger write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationView {
    /// `delivered`, `skipped` or `failed`.
    pub status: String,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&DeliveryResult> for NotificationView {
    fn from(result: &DeliveryResult) -> Self {
        match result {
            DeliveryResult::Delivered => Self {
                status: "delivered".to_string(),
                error: None,
            },
            DeliveryResult::Skipped => Self {
                status: "skipped".to_string(),
                error: None,
            },
            DeliveryResult::Failed(err) => Self {
                status: "failed".to_string(),
                error: Some(err.to_string()),
            },
        }
    }
}

/// Response body of shift writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWriteResponse {
    /// What the write did.
    pub event: ShiftEvent,
    /// The shift after the write.
    pub shift: ShiftView,
    /// Notification outcome. Informational only.
    pub notification: NotificationView,
}

impl From<&LedgerOutcome> for ShiftWriteResponse {
    fn from(outcome: &LedgerOutcome) -> Self {
        Self {
            event: outcome.event,
            shift: ShiftView::from(&outcome.record),
            notification: NotificationView::from(&outcome.delivery),
        }
    }
}

/// One line of the administrative review listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewView {
    /// Worker name.
    pub worker_name: String,
    /// Worker phone.
    pub worker_phone: String,
    /// The shift.
    #[serde(flatten)]
    pub shift: ShiftView,
}

impl From<&ReviewEntry> for ReviewView {
    fn from(entry: &ReviewEntry) -> Self {
        Self {
            worker_name: entry.worker.name.clone(),
            worker_phone: entry.worker.phone.clone(),
            shift: ShiftView::from(&entry.shift),
        }
    }
}
