use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::clock::{ClockError, TimeRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(Self::Available),
            "unavailable" => Some(Self::Unavailable),
            _ => None,
        }
    }
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AvailabilityError {
    #[error("unavailable days cannot carry a time window")]
    WindowOnUnavailable,
    #[error(transparent)]
    Clock(#[from] ClockError),
}

/// One user's availability on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub user_id: String,
    pub date: NaiveDate,
    pub status: AvailabilityStatus,
    /// `None` on an available day means all day.
    pub window: Option<TimeRange>,
}

impl Availability {
    pub fn new(
        user_id: impl Into<String>,
        date: NaiveDate,
        status: AvailabilityStatus,
        window: Option<TimeRange>,
    ) -> Result<Self, AvailabilityError> {
        if status == AvailabilityStatus::Unavailable && window.is_some() {
            return Err(AvailabilityError::WindowOnUnavailable);
        }
        Ok(Self {
            user_id: user_id.into(),
            date,
            status,
            window,
        })
    }

    /// Parse raw form fields into a record.
    pub fn from_parts(
        user_id: impl Into<String>,
        date: NaiveDate,
        status: AvailabilityStatus,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Self, AvailabilityError> {
        let window = TimeRange::parse_optional(start, end)?;
        Self::new(user_id, date, status, window)
    }

    /// Whether working `range` on this date fits what the user submitted.
    pub fn permits(&self, range: &TimeRange) -> bool {
        match (self.status, &self.window) {
            (AvailabilityStatus::Unavailable, _) => false,
            (AvailabilityStatus::Available, None) => true,
            (AvailabilityStatus::Available, Some(window)) => window.covers(range),
        }
    }
}
