use chrono::{Duration, NaiveDate};

use shifttrack_api::{AvailabilityStatus, CreateShiftRequest, UpsertAvailabilityRequest};

/// A Monday far enough out that specs never race the real calendar.
pub fn week_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 3, 3).expect("valid fixture date")
}

/// `offset` days after [`week_start`], formatted for the wire.
pub fn day(offset: i64) -> String {
    (week_start() + Duration::days(offset)).to_string()
}

pub fn shift(user_id: &str, offset: i64, start: &str, end: &str) -> CreateShiftRequest {
    CreateShiftRequest {
        user_id: user_id.to_string(),
        date: day(offset),
        start_time: start.to_string(),
        end_time: end.to_string(),
        notes: None,
    }
}

pub fn available(offset: i64, window: Option<(&str, &str)>) -> UpsertAvailabilityRequest {
    UpsertAvailabilityRequest {
        date: day(offset),
        status: AvailabilityStatus::Available,
        start_time: window.map(|(s, _)| s.to_string()),
        end_time: window.map(|(_, e)| e.to_string()),
    }
}

pub fn unavailable(offset: i64) -> UpsertAvailabilityRequest {
    UpsertAvailabilityRequest {
        date: day(offset),
        status: AvailabilityStatus::Unavailable,
        start_time: None,
        end_time: None,
    }
}
