//! Durable storage of workers and shift records.
//!
//! The [`ShiftStore`] trait is the single writer of shift state. Its write
//! operations are atomic with respect to the `(worker, date)` key: inserting
//! a second shift for the same worker and day reports
//! [`InsertOutcome::Duplicate`] instead of writing, and closing a shift only
//! succeeds against a record whose exit time is still absent. Callers never
//! need a separate existence check to keep one shift per worker per day.
//!
//! Two implementations are provided: [`MemoryStore`] and [`SqliteStore`].

mod memory;
mod sqlite;

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use tracing::info;

use crate::config::{StorageBackend, StorageSettings};
use crate::error::EngineResult;
use crate::models::{
    NewShift, NewWorker, PayrollQuery, ShiftClosing, ShiftId, ShiftRecord, Worker, WorkerId,
};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Result of an insert guarded by a uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    /// The row was written.
    Inserted(T),
    /// A row with the same unique key already exists; nothing was written.
    Duplicate,
}

/// Selection of shift records for scans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftFilter {
    /// Only shifts of this worker.
    pub worker_id: Option<WorkerId>,
    /// Only shifts in this calendar year.
    pub year: Option<i32>,
    /// Only shifts in this month (1-12).
    pub month: Option<u32>,
    /// Only shifts without an exit time.
    pub open_only: bool,
}

impl ShiftFilter {
    /// Filter for the open shifts of one worker, or of everyone.
    pub fn open(worker_id: Option<WorkerId>) -> Self {
        Self {
            worker_id,
            open_only: true,
            ..Self::default()
        }
    }

    /// Returns true if the record is selected by this filter.
    pub fn matches(&self, record: &ShiftRecord) -> bool {
        self.worker_id.is_none_or(|id| id == record.worker_id)
            && self.year.is_none_or(|year| year == record.date.year())
            && self.month.is_none_or(|month| month == record.date.month())
            && (!self.open_only || record.is_open())
    }
}

impl From<&PayrollQuery> for ShiftFilter {
    fn from(query: &PayrollQuery) -> Self {
        Self {
            worker_id: query.worker_id,
            year: query.year,
            month: query.month,
            open_only: false,
        }
    }
}

/// Persistent store contract used by the ledger.
///
/// Scans return shifts ordered by date descending, newest id first within a
/// date.
pub trait ShiftStore: Send + Sync {
    /// Registers a worker; [`InsertOutcome::Duplicate`] if the phone is taken.
    fn insert_worker(&self, worker: &NewWorker) -> EngineResult<InsertOutcome<Worker>>;

    /// Point lookup of a worker by id.
    fn worker(&self, id: WorkerId) -> EngineResult<Option<Worker>>;

    /// Point lookup of a worker by normalized phone.
    fn worker_by_phone(&self, phone: &str) -> EngineResult<Option<Worker>>;

    /// All workers ordered by name.
    fn workers(&self) -> EngineResult<Vec<Worker>>;

    /// Creates a shift; [`InsertOutcome::Duplicate`] if the worker already has
    /// a shift on that date.
    fn insert_shift(&self, shift: &NewShift) -> EngineResult<InsertOutcome<ShiftRecord>>;

    /// Point lookup of a shift by id.
    fn shift(&self, id: ShiftId) -> EngineResult<Option<ShiftRecord>>;

    /// Point lookup of a shift by worker and date.
    fn shift_for_day(&self, worker_id: WorkerId, date: NaiveDate)
    -> EngineResult<Option<ShiftRecord>>;

    /// Closes the open shift of a worker on a date.
    ///
    /// Returns the updated record, or `None` when there is no shift for that
    /// key or it is already closed.
    fn close_open_shift(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
        closing: &ShiftClosing,
    ) -> EngineResult<Option<ShiftRecord>>;

    /// Overwrites the extra allowance of a shift regardless of its state.
    fn set_extra_allowance(
        &self,
        id: ShiftId,
        amount: Decimal,
    ) -> EngineResult<Option<ShiftRecord>>;

    /// Scans shifts selected by `filter`.
    fn shifts(&self, filter: &ShiftFilter) -> EngineResult<Vec<ShiftRecord>>;
}

/// Opens the store selected by the storage settings.
pub fn open_store(settings: &StorageSettings) -> EngineResult<Arc<dyn ShiftStore>> {
    match settings.backend {
        StorageBackend::Sqlite => {
            info!(path = %settings.database_path.display(), "Using SQLite store");
            Ok(Arc::new(SqliteStore::open(&settings.database_path)?))
        }
        StorageBackend::Memory => {
            info!("Using in-memory store; records are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn record(day: &str, exit: Option<&str>) -> ShiftRecord {
        ShiftRecord {
            id: ShiftId(1),
            worker_id: WorkerId(2),
            date: NaiveDate::parse_from_str(day, "%Y-%m-%d").unwrap(),
            entry_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            exit_time: exit.map(|e| NaiveTime::parse_from_str(e, "%H:%M").unwrap()),
            car: false,
            extra_allowance: Decimal::ZERO,
        }
    }

    #[test]
    fn test_default_filter_matches_everything() {
        assert!(ShiftFilter::default().matches(&record("2024-05-01", None)));
        assert!(ShiftFilter::default().matches(&record("2024-05-01", Some("17:00"))));
    }

    #[test]
    fn test_open_filter_skips_closed() {
        let filter = ShiftFilter::open(Some(WorkerId(2)));
        assert!(filter.matches(&record("2024-05-01", None)));
        assert!(!filter.matches(&record("2024-05-01", Some("17:00"))));
        assert!(!ShiftFilter::open(Some(WorkerId(3))).matches(&record("2024-05-01", None)));
    }

    #[test]
    fn test_filter_from_payroll_query() {
        let filter = ShiftFilter::from(&PayrollQuery {
            worker_id: None,
            year: Some(2024),
            month: Some(6),
        });
        assert!(!filter.matches(&record("2024-05-01", Some("17:00"))));
        assert!(filter.matches(&record("2024-06-30", Some("17:00"))));
    }

    #[test]
    fn test_open_store_memory_backend() {
        let settings = StorageSettings {
            backend: StorageBackend::Memory,
            ..StorageSettings::default()
        };
        let store = open_store(&settings).unwrap();
        assert!(store.workers().unwrap().is_empty());
    }
}
