//! Week banding. Schedules are keyed by the first day of their week.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Which weekday opens a schedule week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Sunday => Weekday::Sun,
        }
    }
}

/// Number of days in a schedule week.
pub const DAYS_PER_WEEK: usize = 7;

/// First day of the week containing `date`.
pub fn week_start_of(date: NaiveDate, start: WeekStart) -> NaiveDate {
    let offset = match start {
        WeekStart::Monday => date.weekday().num_days_from_monday(),
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
    };
    date - Duration::days(i64::from(offset))
}

pub fn is_week_start(date: NaiveDate, start: WeekStart) -> bool {
    date.weekday() == start.weekday()
}

/// The seven dates of a week, in order.
pub fn week_dates(week_start: NaiveDate) -> [NaiveDate; DAYS_PER_WEEK] {
    std::array::from_fn(|i| week_start + Duration::days(i as i64))
}

pub fn week_end(week_start: NaiveDate) -> NaiveDate {
    week_start + Duration::days(DAYS_PER_WEEK as i64 - 1)
}

pub fn week_contains(week_start: NaiveDate, date: NaiveDate) -> bool {
    date >= week_start && date <= week_end(week_start)
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn monday_weeks() {
        // 2026-10-18 is a Sunday.
        assert_eq!(week_start_of(d(2026, 10, 18), WeekStart::Monday), d(2026, 10, 12));
        assert_eq!(week_start_of(d(2026, 10, 12), WeekStart::Monday), d(2026, 10, 12));
        assert_eq!(week_start_of(d(2026, 10, 14), WeekStart::Monday), d(2026, 10, 12));
    }

    #[test]
    fn sunday_weeks() {
        assert_eq!(week_start_of(d(2026, 10, 18), WeekStart::Sunday), d(2026, 10, 18));
        assert_eq!(week_start_of(d(2026, 10, 24), WeekStart::Sunday), d(2026, 10, 18));
        assert!(is_week_start(d(2026, 10, 18), WeekStart::Sunday));
        assert!(!is_week_start(d(2026, 10, 18), WeekStart::Monday));
    }

    #[test]
    fn week_crosses_month_and_year() {
        let dates = week_dates(d(2026, 12, 28));
        assert_eq!(dates[0], d(2026, 12, 28));
        assert_eq!(dates[6], d(2027, 1, 3));
        assert!(week_contains(d(2026, 12, 28), d(2027, 1, 3)));
        assert!(!week_contains(d(2026, 12, 28), d(2027, 1, 4)));
        assert!(!week_contains(d(2026, 12, 28), d(2026, 12, 27)));
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date("2026-10-12"), Some(d(2026, 10, 12)));
        assert_eq!(parse_date("12/10/2026"), None);
        assert_eq!(parse_date("2026-02-30"), None);
    }
}
