//! SQLite-backed store.
//!
//! The `(worker_id, date)` uniqueness of shifts is enforced by the schema;
//! a constraint violation on insert is reported as
//! [`InsertOutcome::Duplicate`]. Closing is a conditional `UPDATE` that only
//! matches rows whose `exit_time` is still `NULL`.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveTime};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    NewShift, NewWorker, ShiftClosing, ShiftId, ShiftRecord, Worker, WorkerId,
};

use super::{InsertOutcome, ShiftFilter, ShiftStore};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

const SHIFT_COLUMNS: &str = "id, worker_id, date, entry_time, exit_time, car, extra_allowance";

/// A [`ShiftStore`] persisted in a SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database file and ensures the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Opened SQLite store");
        Self::with_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> EngineResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> EngineResult<Self> {
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> EngineResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| EngineError::StoreUnavailable {
            message: "sqlite connection lock poisoned".to_string(),
        })
    }
}

/// Creates the tables and indexes if they do not exist.
fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS workers (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            phone       TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        );

        CREATE TABLE IF NOT EXISTS shifts (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id        INTEGER NOT NULL REFERENCES workers(id),
            date             TEXT NOT NULL,
            entry_time       TEXT NOT NULL,
            exit_time        TEXT,
            car              INTEGER NOT NULL DEFAULT 0 CHECK(car IN (0, 1)),
            extra_allowance  TEXT NOT NULL DEFAULT '0',
            UNIQUE(worker_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_shifts_date ON shifts(date);
        "#,
    )
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(EngineError::StoreUnavailable { message }),
    )
}

fn map_worker_row(row: &Row) -> rusqlite::Result<Worker> {
    Ok(Worker {
        id: WorkerId(row.get("id")?),
        name: row.get("name")?,
        phone: row.get("phone")?,
    })
}

fn map_shift_row(row: &Row) -> rusqlite::Result<ShiftRecord> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|_| conversion_error(2, format!("invalid date '{}'", date_str)))?;

    let entry_str: String = row.get("entry_time")?;
    let entry_time = NaiveTime::parse_from_str(&entry_str, TIME_FORMAT)
        .map_err(|_| conversion_error(3, format!("invalid entry time '{}'", entry_str)))?;

    let exit_str: Option<String> = row.get("exit_time")?;
    let exit_time = exit_str
        .map(|s| {
            NaiveTime::parse_from_str(&s, TIME_FORMAT)
                .map_err(|_| conversion_error(4, format!("invalid exit time '{}'", s)))
        })
        .transpose()?;

    let amount_str: String = row.get("extra_allowance")?;
    let extra_allowance = Decimal::from_str(&amount_str)
        .map_err(|_| conversion_error(6, format!("invalid allowance '{}'", amount_str)))?;

    Ok(ShiftRecord {
        id: ShiftId(row.get("id")?),
        worker_id: WorkerId(row.get("worker_id")?),
        date,
        entry_time,
        exit_time,
        car: row.get::<_, i64>("car")? == 1,
        extra_allowance,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

fn load_shift(conn: &Connection, id: i64) -> rusqlite::Result<Option<ShiftRecord>> {
    conn.query_row(
        &format!("SELECT {} FROM shifts WHERE id = ?1", SHIFT_COLUMNS),
        [id],
        map_shift_row,
    )
    .optional()
}

impl ShiftStore for SqliteStore {
    fn insert_worker(&self, worker: &NewWorker) -> EngineResult<InsertOutcome<Worker>> {
        let conn = self.conn()?;
        match conn.execute(
            "INSERT INTO workers (name, phone) VALUES (?1, ?2)",
            params![worker.name, worker.phone],
        ) {
            Ok(_) => Ok(InsertOutcome::Inserted(Worker {
                id: WorkerId(conn.last_insert_rowid()),
                name: worker.name.clone(),
                phone: worker.phone.clone(),
            })),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    fn worker(&self, id: WorkerId) -> EngineResult<Option<Worker>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, name, phone FROM workers WHERE id = ?1",
                [id.0],
                map_worker_row,
            )
            .optional()?)
    }

    fn worker_by_phone(&self, phone: &str) -> EngineResult<Option<Worker>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id, name, phone FROM workers WHERE phone = ?1",
                [phone],
                map_worker_row,
            )
            .optional()?)
    }

    fn workers(&self) -> EngineResult<Vec<Worker>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, phone FROM workers ORDER BY name, id")?;
        let rows = stmt.query_map([], map_worker_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn insert_shift(&self, shift: &NewShift) -> EngineResult<InsertOutcome<ShiftRecord>> {
        let conn = self.conn()?;
        let result = conn.execute(
            "INSERT INTO shifts (worker_id, date, entry_time, exit_time, car, extra_allowance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                shift.worker_id.0,
                format_date(shift.date),
                format_time(shift.entry_time),
                shift.exit_time.map(format_time),
                shift.car,
                shift.extra_allowance.to_string(),
            ],
        );

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(ShiftRecord {
                id: ShiftId(conn.last_insert_rowid()),
                worker_id: shift.worker_id,
                date: shift.date,
                entry_time: shift.entry_time,
                exit_time: shift.exit_time,
                car: shift.car,
                extra_allowance: shift.extra_allowance,
            })),
            Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    fn shift(&self, id: ShiftId) -> EngineResult<Option<ShiftRecord>> {
        let conn = self.conn()?;
        Ok(load_shift(&conn, id.0)?)
    }

    fn shift_for_day(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
    ) -> EngineResult<Option<ShiftRecord>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                &format!(
                    "SELECT {} FROM shifts WHERE worker_id = ?1 AND date = ?2",
                    SHIFT_COLUMNS
                ),
                params![worker_id.0, format_date(date)],
                map_shift_row,
            )
            .optional()?)
    }

    fn close_open_shift(
        &self,
        worker_id: WorkerId,
        date: NaiveDate,
        closing: &ShiftClosing,
    ) -> EngineResult<Option<ShiftRecord>> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE shifts
             SET exit_time = ?1,
                 car = COALESCE(?2, car),
                 extra_allowance = COALESCE(?3, extra_allowance)
             WHERE worker_id = ?4 AND date = ?5 AND exit_time IS NULL",
            params![
                format_time(closing.exit_time),
                closing.car,
                closing.extra_allowance.map(|a| a.to_string()),
                worker_id.0,
                format_date(date),
            ],
        )?;

        if changed == 0 {
            return Ok(None);
        }

        Ok(conn
            .query_row(
                &format!(
                    "SELECT {} FROM shifts WHERE worker_id = ?1 AND date = ?2",
                    SHIFT_COLUMNS
                ),
                params![worker_id.0, format_date(date)],
                map_shift_row,
            )
            .optional()?)
    }

    fn set_extra_allowance(
        &self,
        id: ShiftId,
        amount: Decimal,
    ) -> EngineResult<Option<ShiftRecord>> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE shifts SET extra_allowance = ?1 WHERE id = ?2",
            params![amount.to_string(), id.0],
        )?;

        if changed == 0 {
            return Ok(None);
        }
        Ok(load_shift(&conn, id.0)?)
    }

    fn shifts(&self, filter: &ShiftFilter) -> EngineResult<Vec<ShiftRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM shifts
             WHERE (?1 IS NULL OR worker_id = ?1)
               AND (?2 IS NULL OR substr(date, 1, 4) = ?2)
               AND (?3 IS NULL OR substr(date, 6, 2) = ?3)
               AND (?4 = 0 OR exit_time IS NULL)
             ORDER BY date DESC, id DESC",
            SHIFT_COLUMNS
        ))?;

        let rows = stmt.query_map(
            params![
                filter.worker_id.map(|w| w.0),
                filter.year.map(|y| format!("{:04}", y)),
                filter.month.map(|m| format!("{:02}", m)),
                filter.open_only,
            ],
            map_shift_row,
        )?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn time(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    fn registered(store: &SqliteStore, name: &str, phone: &str) -> Worker {
        match store.insert_worker(&NewWorker::new(name, phone).unwrap()).unwrap() {
            InsertOutcome::Inserted(worker) => worker,
            InsertOutcome::Duplicate => panic!("phone already registered"),
        }
    }

    fn new_shift(worker_id: WorkerId, day: &str, exit: Option<&str>) -> NewShift {
        NewShift {
            worker_id,
            date: date(day),
            entry_time: time("09:00"),
            exit_time: exit.map(time),
            car: false,
            extra_allowance: Decimal::ZERO,
        }
    }

    #[test]
    fn test_unique_index_rejects_second_shift() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ana = registered(&store, "Ana", "600111222");

        let first = store
            .insert_shift(&new_shift(ana.id, "2024-05-01", Some("17:00")))
            .unwrap();
        assert!(matches!(first, InsertOutcome::Inserted(_)));

        let second = store
            .insert_shift(&new_shift(ana.id, "2024-05-01", None))
            .unwrap();
        assert_eq!(second, InsertOutcome::Duplicate);

        let stored = store.shift_for_day(ana.id, date("2024-05-01")).unwrap().unwrap();
        assert_eq!(stored.exit_time, Some(time("17:00")));
    }

    #[test]
    fn test_same_date_different_workers_is_allowed() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ana = registered(&store, "Ana", "600111222");
        let bruno = registered(&store, "Bruno", "600333444");

        for worker in [ana.id, bruno.id] {
            assert!(matches!(
                store.insert_shift(&new_shift(worker, "2024-05-01", None)).unwrap(),
                InsertOutcome::Inserted(_)
            ));
        }
    }

    #[test]
    fn test_duplicate_phone_is_reported() {
        let store = SqliteStore::open_in_memory().unwrap();
        registered(&store, "Ana", "600111222");
        let outcome = store
            .insert_worker(&NewWorker::new("Other", "600111222").unwrap())
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Duplicate);
    }

    #[test]
    fn test_close_keeps_unsupplied_columns() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ana = registered(&store, "Ana", "600111222");
        let mut shift = new_shift(ana.id, "2024-05-01", None);
        shift.car = true;
        shift.extra_allowance = Decimal::new(500, 2);
        store.insert_shift(&shift).unwrap();

        let closed = store
            .close_open_shift(
                ana.id,
                date("2024-05-01"),
                &ShiftClosing {
                    exit_time: time("17:30"),
                    car: None,
                    extra_allowance: None,
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(closed.exit_time, Some(time("17:30")));
        assert!(closed.car);
        assert_eq!(closed.extra_allowance, Decimal::new(5, 0));
    }

    #[test]
    fn test_close_of_closed_shift_matches_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ana = registered(&store, "Ana", "600111222");
        store
            .insert_shift(&new_shift(ana.id, "2024-05-01", Some("17:00")))
            .unwrap();

        let result = store
            .close_open_shift(
                ana.id,
                date("2024-05-01"),
                &ShiftClosing {
                    exit_time: time("18:00"),
                    car: Some(true),
                    extra_allowance: None,
                },
            )
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_allowance_round_trips_exactly() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ana = registered(&store, "Ana", "600111222");
        let InsertOutcome::Inserted(shift) = store
            .insert_shift(&new_shift(ana.id, "2024-05-01", None))
            .unwrap()
        else {
            panic!("expected insert");
        };

        let amount = Decimal::from_str("12.345").unwrap();
        let updated = store.set_extra_allowance(shift.id, amount).unwrap().unwrap();
        assert_eq!(updated.extra_allowance, amount);
        assert_eq!(store.shift(shift.id).unwrap().unwrap().extra_allowance, amount);
        assert_eq!(store.set_extra_allowance(ShiftId(999), amount).unwrap(), None);
    }

    #[test]
    fn test_scan_filters_by_month_and_open_state() {
        let store = SqliteStore::open_in_memory().unwrap();
        let ana = registered(&store, "Ana", "600111222");
        store
            .insert_shift(&new_shift(ana.id, "2024-04-30", Some("17:00")))
            .unwrap();
        store
            .insert_shift(&new_shift(ana.id, "2024-05-01", Some("17:00")))
            .unwrap();
        store.insert_shift(&new_shift(ana.id, "2024-05-02", None)).unwrap();

        let may = store
            .shifts(&ShiftFilter {
                year: Some(2024),
                month: Some(5),
                ..ShiftFilter::default()
            })
            .unwrap();
        let dates: Vec<NaiveDate> = may.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date("2024-05-02"), date("2024-05-01")]);

        let open = store.shifts(&ShiftFilter::open(None)).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].date, date("2024-05-02"));
    }

    #[test]
    fn test_records_survive_reopen() {
        let path = std::env::temp_dir().join(format!("shift-ledger-{}.db", uuid::Uuid::new_v4()));

        {
            let store = SqliteStore::open(&path).unwrap();
            let ana = registered(&store, "Ana", "600111222");
            store
                .insert_shift(&new_shift(ana.id, "2024-05-01", Some("17:00")))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let ana = store.worker_by_phone("600111222").unwrap().unwrap();
        assert_eq!(ana.name, "Ana");
        assert_eq!(
            store.insert_shift(&new_shift(ana.id, "2024-05-01", None)).unwrap(),
            InsertOutcome::Duplicate
        );

        drop(store);
        let _ = std::fs::remove_file(&path);
    }
}
