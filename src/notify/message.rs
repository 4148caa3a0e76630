//! Message composition for ledger events.

use crate::calculation::{format_time_of_day, round_for_display};
use crate::models::{ShiftRecord, Worker};

use super::ShiftEvent;

/// Builds the text sent for a ledger event.
///
/// # Examples
///
/// ```
/// use shift_ledger::models::{ShiftId, ShiftRecord, Worker, WorkerId};
/// use shift_ledger::notify::{ShiftEvent, compose_message};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// let worker = Worker { id: WorkerId(1), name: "Ana".to_string(), phone: "600111222".to_string() };
/// let shift = ShiftRecord {
///     id: ShiftId(1),
///     worker_id: worker.id,
///     date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
///     entry_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     exit_time: None,
///     car: false,
///     extra_allowance: Decimal::ZERO,
/// };
///
/// let text = compose_message(ShiftEvent::Opened, &worker, &shift);
/// assert!(text.starts_with("Shift opened: Ana (600111222)"));
/// ```
pub fn compose_message(event: ShiftEvent, worker: &Worker, shift: &ShiftRecord) -> String {
    let mut lines = vec![
        format!("{}: {} ({})", event.title(), worker.name, worker.phone),
        format!("Date: {}", shift.date.format("%Y-%m-%d")),
        format!("Entry: {}", format_time_of_day(shift.entry_time)),
    ];

    match shift.exit_time {
        Some(exit) => lines.push(format!("Exit: {}", format_time_of_day(exit))),
        None => lines.push("Exit: --".to_string()),
    }

    if let Some(hours) = shift.worked_hours() {
        lines.push(format!("Hours: {}", round_for_display(hours)));
    }

    lines.push(format!("Car: {}", if shift.car { "yes" } else { "no" }));

    if !shift.extra_allowance.is_zero() {
        lines.push(format!("Extra: {}", round_for_display(shift.extra_allowance)));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ShiftId, WorkerId};
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;

    fn worker() -> Worker {
        Worker {
            id: WorkerId(1),
            name: "Ana".to_string(),
            phone: "600111222".to_string(),
        }
    }

    fn shift(exit: Option<&str>, car: bool, extra: Decimal) -> ShiftRecord {
        ShiftRecord {
            id: ShiftId(4),
            worker_id: WorkerId(1),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            entry_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            exit_time: exit.map(|e| NaiveTime::parse_from_str(e, "%H:%M").unwrap()),
            car,
            extra_allowance: extra,
        }
    }

    #[test]
    fn test_opened_message() {
        let text = compose_message(ShiftEvent::Opened, &worker(), &shift(None, false, Decimal::ZERO));
        assert_eq!(
            text,
            "Shift opened: Ana (600111222)\nDate: 2024-05-01\nEntry: 09:00\nExit: --\nCar: no"
        );
    }

    #[test]
    fn test_closed_message_includes_hours_and_extra() {
        let text = compose_message(
            ShiftEvent::Closed,
            &worker(),
            &shift(Some("17:30"), true, Decimal::new(5, 0)),
        );
        assert_eq!(
            text,
            "Shift closed: Ana (600111222)\nDate: 2024-05-01\nEntry: 09:00\nExit: 17:30\nHours: 8.50\nCar: yes\nExtra: 5.00"
        );
    }
}
