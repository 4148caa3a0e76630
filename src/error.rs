//! Error types for the shift ledger.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition a ledger, payroll or configuration operation can
//! report back to its caller. Notification delivery failures are not part
//! of this type; see [`crate::notify::DeliveryError`].

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// The main error type for the shift ledger.
///
/// # Example
///
/// ```
/// use shift_ledger::error::EngineError;
/// use chrono::NaiveDate;
///
/// let error = EngineError::DuplicateShift {
///     worker: "Ana".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
///     still_open: false,
/// };
/// assert_eq!(
///     error.to_string(),
///     "Worker 'Ana' already has a closed shift on 2024-05-01"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A shift already exists for the worker on that date.
    #[error("Worker '{worker}' already has {} shift on {date}", shift_state(.still_open))]
    DuplicateShift {
        /// Display name of the worker.
        worker: String,
        /// The date already taken.
        date: NaiveDate,
        /// Whether the existing shift is still waiting for its exit time.
        still_open: bool,
    },

    /// A worker with the same contact handle is already registered.
    #[error("A worker with phone '{phone}' is already registered")]
    WorkerAlreadyRegistered {
        /// The duplicated contact handle.
        phone: String,
    },

    /// The referenced worker does not exist.
    #[error("Worker not found: {key}")]
    WorkerNotFound {
        /// The id or phone used for the lookup.
        key: String,
    },

    /// The referenced shift does not exist.
    #[error("Shift not found: {key}")]
    ShiftNotFound {
        /// The shift id, or worker and date, used for the lookup.
        key: String,
    },

    /// A close was attempted on a shift that already has an exit time.
    #[error("Shift of worker '{worker}' on {date} is already closed at {exit_time}")]
    ShiftAlreadyClosed {
        /// Display name of the worker.
        worker: String,
        /// The shift date.
        date: NaiveDate,
        /// The exit time already recorded.
        exit_time: NaiveTime,
    },

    /// Caller input was malformed.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },

    /// An administrative operation was attempted without valid credentials.
    #[error("Administrative credentials missing or invalid")]
    Unauthorized,

    /// The SQLite store reported an error.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The store could not be used (poisoned lock, corrupted row).
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The configuration key.
        field: String,
        /// Why it was rejected.
        message: String,
    },
}

impl EngineError {
    /// Builds a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn shift_state(still_open: &bool) -> &'static str {
    if *still_open { "an open" } else { "a closed" }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
