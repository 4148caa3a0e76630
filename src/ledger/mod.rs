//! The shift ledger.
//!
//! [`ShiftLedger`] owns shift records. It keeps at most one shift per worker
//! and date, creates shifts (open or already closed), closes open shifts and
//! lets an administrator correct the extra allowance. Every check that
//! guards a write is performed by the store as part of the write itself,
//! so concurrent submissions for the same worker and day cannot both win.
//!
//! Successful shift writes are followed by one best-effort notification. Its
//! outcome is reported in [`LedgerOutcome::delivery`] and never changes the
//! result of the write.

mod submission;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::auth::AdminSession;
use crate::calculation::compute_payroll;
use crate::config::PayrollSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    NewShift, NewWorker, PayrollQuery, PayrollRow, ShiftClosing, ShiftId, ShiftRecord, Worker,
    WorkerId, normalize_phone,
};
use crate::notify::{NotificationDispatcher, ShiftEvent};
use crate::store::{InsertOutcome, ShiftFilter, ShiftStore};

pub use submission::{CloseSubmission, LedgerOutcome, ReviewEntry, ShiftSubmission};

/// Attendance ledger over a [`ShiftStore`].
pub struct ShiftLedger {
    store: Arc<dyn ShiftStore>,
    dispatcher: NotificationDispatcher,
    payroll: PayrollSettings,
}

impl ShiftLedger {
    /// Creates a ledger.
    pub fn new(
        store: Arc<dyn ShiftStore>,
        dispatcher: NotificationDispatcher,
        payroll: PayrollSettings,
    ) -> Self {
        Self {
            store,
            dispatcher,
            payroll,
        }
    }

    // ------------------------------------------------------------------
    // Workers
    // ------------------------------------------------------------------

    /// Registers a new worker.
    ///
    /// Fails with [`EngineError::WorkerAlreadyRegistered`] if the phone is
    /// already in use.
    pub fn register_worker(&self, name: &str, phone: &str) -> EngineResult<Worker> {
        let new_worker = NewWorker::new(name, phone)?;
        match self.store.insert_worker(&new_worker)? {
            InsertOutcome::Inserted(worker) => {
                info!(worker_id = %worker.id, name = %worker.name, "Worker registered");
                Ok(worker)
            }
            InsertOutcome::Duplicate => Err(EngineError::WorkerAlreadyRegistered {
                phone: new_worker.phone,
            }),
        }
    }

    /// Finds a worker by phone, registering it when a name is supplied.
    ///
    /// Without a name an unknown phone is [`EngineError::WorkerNotFound`].
    pub fn ensure_worker(&self, phone: &str, name: Option<&str>) -> EngineResult<Worker> {
        let phone = normalize_phone(phone)?;
        if let Some(worker) = self.store.worker_by_phone(&phone)? {
            return Ok(worker);
        }

        let Some(name) = name else {
            return Err(EngineError::WorkerNotFound { key: phone });
        };

        match self.store.insert_worker(&NewWorker::new(name, &phone)?)? {
            InsertOutcome::Inserted(worker) => {
                info!(worker_id = %worker.id, name = %worker.name, "Worker registered on first shift");
                Ok(worker)
            }
            // Registered concurrently by another request.
            InsertOutcome::Duplicate => self
                .store
                .worker_by_phone(&phone)?
                .ok_or(EngineError::WorkerNotFound { key: phone }),
        }
    }

    /// Looks up a worker by id.
    pub fn worker(&self, id: WorkerId) -> EngineResult<Worker> {
        self.store
            .worker(id)?
            .ok_or_else(|| EngineError::WorkerNotFound {
                key: id.to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Shift writes
    // ------------------------------------------------------------------

    /// Records a clock-in, or a complete shift when an exit time is given.
    ///
    /// * No shift yet for the worker and date: a new one is created, closed
    ///   if `exit_time` is present and open otherwise.
    /// * An open shift exists and `exit_time` is present: the open shift is
    ///   closed, as with [`ShiftLedger::close_shift`].
    /// * Otherwise: [`EngineError::DuplicateShift`] and nothing is changed.
    pub async fn open_or_record_shift(
        &self,
        submission: ShiftSubmission,
    ) -> EngineResult<LedgerOutcome> {
        let worker = self.worker(submission.worker_id)?;
        let allowance = self.resolve_allowance(submission.car, submission.extra_allowance)?;

        let new_shift = NewShift {
            worker_id: worker.id,
            date: submission.date,
            entry_time: submission.entry_time,
            exit_time: submission.exit_time,
            car: submission.car.unwrap_or(false),
            extra_allowance: allowance.unwrap_or(Decimal::ZERO),
        };

        match self.store.insert_shift(&new_shift)? {
            InsertOutcome::Inserted(record) => {
                let event = if record.is_open() {
                    ShiftEvent::Opened
                } else {
                    ShiftEvent::Closed
                };
                info!(
                    shift_id = %record.id,
                    worker_id = %worker.id,
                    date = %record.date,
                    %event,
                    "Shift recorded"
                );
                Ok(self.finish(event, &worker, record).await)
            }
            InsertOutcome::Duplicate => {
                let Some(exit_time) = submission.exit_time else {
                    let existing = self.store.shift_for_day(worker.id, submission.date)?;
                    return Err(self.duplicate(&worker, submission.date, existing.as_ref()));
                };

                debug!(
                    worker_id = %worker.id,
                    date = %submission.date,
                    "Shift exists for the day, trying to close it"
                );
                let closing = ShiftClosing {
                    exit_time,
                    car: submission.car,
                    extra_allowance: allowance,
                };
                match self
                    .store
                    .close_open_shift(worker.id, submission.date, &closing)?
                {
                    Some(record) => {
                        info!(
                            shift_id = %record.id,
                            worker_id = %worker.id,
                            date = %record.date,
                            "Open shift closed by resubmission"
                        );
                        Ok(self.finish(ShiftEvent::Closed, &worker, record).await)
                    }
                    None => {
                        let existing = self.store.shift_for_day(worker.id, submission.date)?;
                        Err(self.duplicate(&worker, submission.date, existing.as_ref()))
                    }
                }
            }
        }
    }

    /// Records the clock-out of the worker's open shift on a date.
    ///
    /// Fails with [`EngineError::ShiftNotFound`] if there is no shift that
    /// day and with [`EngineError::ShiftAlreadyClosed`] if it already has an
    /// exit time.
    pub async fn close_shift(&self, submission: CloseSubmission) -> EngineResult<LedgerOutcome> {
        let worker = self.worker(submission.worker_id)?;
        let closing = ShiftClosing {
            exit_time: submission.exit_time,
            car: submission.car,
            extra_allowance: self.resolve_allowance(submission.car, submission.extra_allowance)?,
        };

        if let Some(record) = self
            .store
            .close_open_shift(worker.id, submission.date, &closing)?
        {
            info!(
                shift_id = %record.id,
                worker_id = %worker.id,
                date = %record.date,
                "Shift closed"
            );
            return Ok(self.finish(ShiftEvent::Closed, &worker, record).await);
        }

        match self.store.shift_for_day(worker.id, submission.date)? {
            None => Err(EngineError::ShiftNotFound {
                key: format!("worker '{}' on {}", worker.name, submission.date),
            }),
            Some(ShiftRecord {
                exit_time: Some(exit_time),
                ..
            }) => Err(EngineError::ShiftAlreadyClosed {
                worker: worker.name,
                date: submission.date,
                exit_time,
            }),
            Some(record) => Err(EngineError::StoreUnavailable {
                message: format!("shift {} is open but could not be closed", record.id),
            }),
        }
    }

    /// Administrative correction of a shift's extra allowance.
    ///
    /// Works on open and closed shifts alike and sends no notification.
    pub fn set_extra_allowance(
        &self,
        session: &AdminSession,
        shift_id: ShiftId,
        amount: Decimal,
    ) -> EngineResult<ShiftRecord> {
        validate_amount(amount)?;

        let record = self
            .store
            .set_extra_allowance(shift_id, amount)?
            .ok_or_else(|| EngineError::ShiftNotFound {
                key: shift_id.to_string(),
            })?;

        info!(
            actor = session.actor(),
            shift_id = %shift_id,
            amount = %amount,
            "Extra allowance corrected"
        );
        Ok(record)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Open shifts of one worker, or of everyone, newest first.
    pub fn open_shifts(&self, worker_id: Option<WorkerId>) -> EngineResult<Vec<ShiftRecord>> {
        self.store.shifts(&ShiftFilter::open(worker_id))
    }

    /// Shift listing for administrative review, newest first.
    pub fn review(
        &self,
        session: &AdminSession,
        filter: &ShiftFilter,
    ) -> EngineResult<Vec<ReviewEntry>> {
        let workers = self.worker_index()?;
        let shifts = self.store.shifts(filter)?;
        debug!(actor = session.actor(), count = shifts.len(), "Shift review");

        shifts
            .into_iter()
            .map(|shift| {
                let worker = workers.get(&shift.worker_id).cloned().ok_or_else(|| {
                    EngineError::WorkerNotFound {
                        key: shift.worker_id.to_string(),
                    }
                })?;
                Ok(ReviewEntry {
                    hours: shift.worked_hours(),
                    shift,
                    worker,
                })
            })
            .collect()
    }

    /// Payroll rows for the query, computed from the current records.
    pub fn payroll(
        &self,
        session: &AdminSession,
        query: &PayrollQuery,
    ) -> EngineResult<Vec<PayrollRow>> {
        query.validate()?;

        let shifts = self.store.shifts(&ShiftFilter::from(query))?;
        let workers = self.worker_index()?;
        let rows = compute_payroll(&shifts, &workers, self.payroll.hourly_rate, query)?;

        debug!(
            actor = session.actor(),
            shifts = shifts.len(),
            rows = rows.len(),
            "Payroll computed"
        );
        Ok(rows)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn worker_index(&self) -> EngineResult<HashMap<WorkerId, Worker>> {
        Ok(self
            .store
            .workers()?
            .into_iter()
            .map(|w| (w.id, w))
            .collect())
    }

    /// Explicit amounts win; otherwise a shift worked with the car gets the
    /// configured car allowance. `None` means "leave as is".
    fn resolve_allowance(
        &self,
        car: Option<bool>,
        explicit: Option<Decimal>,
    ) -> EngineResult<Option<Decimal>> {
        match explicit {
            Some(amount) => {
                validate_amount(amount)?;
                Ok(Some(amount))
            }
            None if car == Some(true) => Ok(Some(self.payroll.car_allowance)),
            None => Ok(None),
        }
    }

    fn duplicate(
        &self,
        worker: &Worker,
        date: NaiveDate,
        existing: Option<&ShiftRecord>,
    ) -> EngineError {
        let still_open = existing.is_some_and(ShiftRecord::is_open);
        warn!(
            worker_id = %worker.id,
            date = %date,
            still_open,
            "Duplicate shift submission rejected"
        );
        EngineError::DuplicateShift {
            worker: worker.name.clone(),
            date,
            still_open,
        }
    }

    async fn finish(&self, event: ShiftEvent, worker: &Worker, record: ShiftRecord) -> LedgerOutcome {
        let delivery = self.dispatcher.notify(event, worker, &record).await;
        LedgerOutcome {
            record,
            event,
            delivery,
        }
    }
}

fn validate_amount(amount: Decimal) -> EngineResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(EngineError::validation(
            "extra_allowance",
            format!("{} is negative", amount),
        ));
    }
    Ok(())
}
