//! Wall-clock time ranges within a single day.
//!
//! Shift and availability times travel as `"HH:MM"` strings. Ranges never
//! cross midnight: `start` must be strictly before `end`.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("start time {start} must be before end time {end}")]
    EmptyRange { start: String, end: String },
}

/// Parse `HH:MM`. An `HH:MM:SS` input is accepted but truncated to the
/// minute, so a parsed time always round-trips through [`format_time`].
pub fn parse_time(input: &str) -> Result<NaiveTime, ClockError> {
    let trimmed = input.trim();
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ClockError::InvalidTime(input.to_string()))?;
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0)
        .ok_or_else(|| ClockError::InvalidTime(input.to_string()))
}

/// Render a time as `HH:MM`.
pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeRange {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, ClockError> {
        if start >= end {
            return Err(ClockError::EmptyRange {
                start: format_time(start),
                end: format_time(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ClockError> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    /// Build a range from optional bounds: both or neither must be present.
    pub fn parse_optional(
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Option<Self>, ClockError> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(s), Some(e)) => Self::parse(s, e).map(Some),
            (Some(s), None) => Err(ClockError::InvalidTime(format!("{s}-?"))),
            (None, Some(e)) => Err(ClockError::InvalidTime(format!("?-{e}"))),
        }
    }

    pub fn minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Half-open overlap: touching ranges (09-12, 12-15) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn covers(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn start_str(&self) -> String {
        format_time(self.start)
    }

    pub fn end_str(&self) -> String {
        format_time(self.end)
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_str(), self.end_str())
    }
}

/// Serde adapter for `NaiveTime` as `HH:MM`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_time(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_time(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parse_accepts_minutes_and_seconds() {
        assert_eq!(parse_time("09:30").unwrap(), t(9, 30));
        assert_eq!(parse_time(" 17:00:00 ").unwrap(), t(17, 0));
        assert!(parse_time("9am").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn seconds_truncate_to_the_minute() {
        assert_eq!(parse_time("09:00:59").unwrap(), t(9, 0));
        assert!(matches!(
            TimeRange::parse("09:00:10", "09:00:50"),
            Err(ClockError::EmptyRange { .. })
        ));
        let range = TimeRange::parse("09:00:30", "09:01:10").unwrap();
        assert_eq!(range.to_string(), "09:00-09:01");
        assert_eq!(range.minutes(), 1);
    }

    #[test]
    fn range_requires_start_before_end() {
        assert!(TimeRange::parse("09:00", "17:00").is_ok());
        assert!(matches!(
            TimeRange::parse("17:00", "09:00"),
            Err(ClockError::EmptyRange { .. })
        ));
        assert!(TimeRange::parse("09:00", "09:00").is_err());
    }

    #[test]
    fn optional_bounds_must_come_in_pairs() {
        assert_eq!(TimeRange::parse_optional(None, None).unwrap(), None);
        assert!(TimeRange::parse_optional(Some("09:00"), None).is_err());
        assert!(TimeRange::parse_optional(None, Some("12:00")).is_err());
        let range = TimeRange::parse_optional(Some("09:00"), Some("12:00"))
            .unwrap()
            .unwrap();
        assert_eq!(range.minutes(), 180);
    }

    #[test]
    fn overlap_is_half_open() {
        let morning = TimeRange::parse("09:00", "12:00").unwrap();
        let afternoon = TimeRange::parse("12:00", "15:00").unwrap();
        let lunch = TimeRange::parse("11:30", "13:00").unwrap();
        assert!(!morning.overlaps(&afternoon));
        assert!(morning.overlaps(&lunch));
        assert!(lunch.overlaps(&afternoon));
    }

    #[test]
    fn covers_includes_equal_bounds() {
        let day = TimeRange::parse("08:00", "18:00").unwrap();
        assert!(day.covers(&TimeRange::parse("08:00", "18:00").unwrap()));
        assert!(!day.covers(&TimeRange::parse("07:59", "12:00").unwrap()));
    }

    #[test]
    fn serializes_as_hhmm() {
        let range = TimeRange::parse("09:05", "17:30").unwrap();
        let json = serde_json::to_value(range).unwrap();
        assert_eq!(json, serde_json::json!({"start": "09:05", "end": "17:30"}));
        let back: TimeRange = serde_json::from_value(json).unwrap();
        assert_eq!(back, range);
    }
}
