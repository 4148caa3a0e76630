//! Payroll aggregation.
//!
//! Folds closed shift records into [`PayrollRow`]s. Without an explicit
//! period the rows are per worker and calendar month; with a year or month
//! in the query they are per worker over that period. Pay for a shift is its
//! worked hours times the configured hourly rate plus the shift's extra
//! allowance. Open shifts contribute nothing.

use std::collections::{BTreeMap, HashMap};

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{PayrollQuery, PayrollRow, ShiftRecord, Worker, WorkerId};

use super::time_span::elapsed_hours;

/// Running totals for one worker and period.
#[derive(Debug, Default)]
struct PeriodTotals {
    shift_count: u32,
    hours: Decimal,
    extra_allowance: Decimal,
}

/// Returns true if the record falls inside the query's worker and period.
pub fn matches_query(record: &ShiftRecord, query: &PayrollQuery) -> bool {
    query.worker_id.is_none_or(|id| id == record.worker_id)
        && query.year.is_none_or(|year| year == record.date.year())
        && query.month.is_none_or(|month| month == record.date.month())
}

/// Computes payroll rows from shift records.
///
/// # Arguments
///
/// * `records` - Shift records to aggregate; records outside `query` are ignored
/// * `workers` - Worker lookup used for display names
/// * `hourly_rate` - The configured hourly wage
/// * `query` - Worker and period filter
///
/// # Returns
///
/// One row per worker and month, or one row per worker when `query` names a
/// period. Rows are ordered by year and month descending, then by worker
/// name. Hour and money totals are unrounded. Returns a validation error for a malformed
/// period.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use shift_ledger::calculation::compute_payroll;
/// use shift_ledger::models::{PayrollQuery, ShiftId, ShiftRecord, Worker, WorkerId};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let ana = Worker { id: WorkerId(1), name: "Ana".to_string(), phone: "600111222".to_string() };
/// let shift = ShiftRecord {
///     id: ShiftId(1),
///     worker_id: ana.id,
///     date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
///     entry_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     exit_time: NaiveTime::from_hms_opt(17, 30, 0),
///     car: true,
///     extra_allowance: Decimal::new(5, 0),
/// };
/// let workers = HashMap::from([(ana.id, ana)]);
///
/// let rows = compute_payroll(&[shift], &workers, Decimal::new(9, 0), &PayrollQuery::default()).unwrap();
/// assert_eq!(rows[0].total_pay, Decimal::new(815, 1));
/// ```
pub fn compute_payroll(
    records: &[ShiftRecord],
    workers: &HashMap<WorkerId, Worker>,
    hourly_rate: Decimal,
    query: &PayrollQuery,
) -> EngineResult<Vec<PayrollRow>> {
    query.validate()?;

    let mut groups: BTreeMap<(WorkerId, Option<i32>, Option<u32>), PeriodTotals> =
        BTreeMap::new();

    for record in records.iter().filter(|r| matches_query(r, query)) {
        let Some(exit_time) = record.exit_time else {
            continue;
        };

        let (year, month) = if query.has_period() {
            (query.year, query.month)
        } else {
            (Some(record.date.year()), Some(record.date.month()))
        };

        let totals = groups.entry((record.worker_id, year, month)).or_default();
        totals.shift_count += 1;
        totals.hours += elapsed_hours(record.entry_time, exit_time);
        totals.extra_allowance += record.extra_allowance;
    }

    let mut rows: Vec<PayrollRow> = groups
        .into_iter()
        .map(|((worker_id, year, month), totals)| {
            let hourly_pay = totals.hours * hourly_rate;
            PayrollRow {
                worker_id,
                worker_name: workers
                    .get(&worker_id)
                    .map(|w| w.name.clone())
                    .unwrap_or_else(|| format!("worker #{}", worker_id)),
                year,
                month,
                shift_count: totals.shift_count,
                total_hours: totals.hours,
                hourly_pay,
                total_extra_allowance: totals.extra_allowance,
                total_pay: hourly_pay + totals.extra_allowance,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.year
            .cmp(&a.year)
            .then(b.month.cmp(&a.month))
            .then_with(|| a.worker_name.cmp(&b.worker_name))
            .then(a.worker_id.cmp(&b.worker_id))
    });

    Ok(rows)
}
