//! In-memory store.
//!
//! All state lives behind one mutex, so every trait call is a single atomic
//! step. Useful for tests and for running the service without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    NewShift, NewWorker, ShiftClosing, ShiftId, ShiftRecord, Worker, WorkerId,
};

use super::{InsertOutcome, ShiftFilter, ShiftStore};

#[derive(Debug, Default)]
struct MemoryState {
    workers: BTreeMap<WorkerId, Worker>,
    phones: HashMap<String, WorkerId>,
    shifts: BTreeMap<ShiftId, ShiftRecord>,
    days: HashMap<(WorkerId, NaiveDate), ShiftId>,
    next_worker_id: i64,
    next_shift_id: i64,
}

/// A [`ShiftStore`] kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| EngineError::StoreUnavailable {
            message: "memory store lock poisoned".to_string(),
        })
    }
}

impl ShiftStore for MemoryStore {
    fn insert_worker(&self, worker: &NewWorker) -> EngineResult<InsertOutcome<Worker>> {
        let mut state = self.lock()?;
        if state.phones.contains_key(&worker.phone) {
            return Ok(InsertOutcome::Duplicate);
        }

        state.next_worker_id += 1;
        let created = Worker {
            id: WorkerId(state.next_worker_id),
            name: worker.name.clone(),
            phone: worker.phone.clone(),
        };
        state.phones.insert(created.phone.clone(), created.id);
        state.workers.insert(created.id, created.clone());
        Ok(InsertOutcome::Inserted(created))
    }

    fn worker(&self, id: WorkerId) -> EngineResult<Option<Worker>> {
        Ok(self.lock()?.workers.get(&id).cloned())
    }

    fn worker_by_phone(&self, phone: &str) -> EngineResult<Option<Worker>> {
        let state = self.lock()?;
        Ok(state
            .phones
            .get(phone)
            .and_then(|id| state.workers.get(id))
            .cloned())
    }

    fn workers(&self) -> EngineResult<Vec<Worker>> {
        let mut workers: Vec<Worker> = self.lock()?.workers.values().cloned().collect();
        workers.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(workers)
    }

    fn insert_shift(&self, shift: &NewShift) -> EngineResult<InsertOutcome<ShiftRecord>> {
        let mut state = self.lock()?;
        let key = (shift.worker_id, shift.date);
        if state.days.contains_key(&key) {
            return Ok(InsertOutcome::Duplicate);
        }

        state.next_shift_id += 1;
        let record = ShiftRecord {
            id: ShiftId(state.next_shift_id),
            worker_id: shift.worker_id,
            date: shift.date,
            entry_time: shift.entry_time,
            exit_time: shift.exit_time,
            car: shift.car,
            extra_allowance: shift.extra_allowance,
        };
        state.days.insert(key, record.id);
        state.shifts.insert(record.id, record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    fn shift(&self, id: ShiftId) -> EngineResult<Option<ShiftRecord>> {
        Ok(self.lock()?.shifts.get(&id).cloned())
    }

    fn shift_for_day(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
    ) -> EngineResult<Option<ShiftRecord>> {
        let state = self.lock()?;
        Ok(state
            .days
            .get(&(worker_id, date))
            .and_then(|id| state.shifts.get(id))
            .cloned())
    }

    fn close_open_shift(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
        closing: &ShiftClosing,
    ) -> EngineResult<Option<ShiftRecord>> {
        let mut state = self.lock()?;
        let Some(id) = state.days.get(&(worker_id, date)).copied() else {
            return Ok(None);
        };

        match state.shifts.get_mut(&id) {
            Some(record) if record.is_open() => {
                closing.apply_to(record);
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    fn set_extra_allowance(
        &self,
        id: ShiftId,
        amount: Decimal,
    ) -> EngineResult<Option<ShiftRecord>> {
        let mut state = self.lock()?;
        Ok(state.shifts.get_mut(&id).map(|record| {
            record.extra_allowance = amount;
            record.clone()
        }))
    }

    fn shifts(&self, filter: &ShiftFilter) -> EngineResult<Vec<ShiftRecord>> {
        let state = self.lock()?;
        let mut shifts: Vec<ShiftRecord> = state
            .shifts
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        shifts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(shifts)
    }
}
