//! Fixture builders shared by unit tests and downstream crates.

use chrono::NaiveDate;

use crate::availability::{Availability, AvailabilityStatus};
use crate::clock::TimeRange;
use crate::membership::ApprovalStatus;
use crate::roster::{EmployeeRow, ManagerRow, ShiftRecord};

pub fn manager_row(user_id: &str, name: &str, status: ApprovalStatus, is_primary: bool) -> ManagerRow {
    ManagerRow {
        user_id: user_id.to_string(),
        display_name: name.to_string(),
        status,
        is_primary,
    }
}

/// Approved employee row.
pub fn employee_row(user_id: &str, name: &str) -> EmployeeRow {
    EmployeeRow {
        user_id: user_id.to_string(),
        display_name: name.to_string(),
        status: ApprovalStatus::Approved,
    }
}

/// Shift fixture; panics on a malformed range.
pub fn shift(id: &str, user_id: &str, date: NaiveDate, start: &str, end: &str) -> ShiftRecord {
    ShiftRecord {
        id: id.to_string(),
        user_id: user_id.to_string(),
        date,
        range: TimeRange::parse(start, end).expect("fixture range"),
        notes: None,
    }
}

pub fn available(user_id: &str, date: NaiveDate, window: Option<(&str, &str)>) -> Availability {
    let window = window.map(|(s, e)| TimeRange::parse(s, e).expect("fixture window"));
    Availability::new(user_id, date, AvailabilityStatus::Available, window)
        .expect("fixture availability")
}

pub fn unavailable(user_id: &str, date: NaiveDate) -> Availability {
    Availability::new(user_id, date, AvailabilityStatus::Unavailable, None)
        .expect("fixture availability")
}
