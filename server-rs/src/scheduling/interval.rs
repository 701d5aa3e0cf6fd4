use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Half-open local-naive interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::Validation(format!(
                "interval end {end} must be after start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn starting_at(start: NaiveDateTime, length: Duration) -> AppResult<Self> {
        Self::new(start, start + length)
    }

    /// The whole calendar day `[00:00, next day 00:00)`.
    pub fn day(date: NaiveDate) -> Self {
        let start = date.and_time(chrono::NaiveTime::MIN);
        Self {
            start,
            end: start + Duration::days(1),
        }
    }

    /// Strict half-open overlap: touching endpoints do not conflict.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }
}

const START_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_date(raw: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn parse_start_time(raw: &str) -> AppResult<NaiveDateTime> {
    let raw = raw.trim();
    START_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| {
            AppError::Validation(format!(
                "invalid start time '{raw}', expected YYYY-MM-DDTHH:MM[:SS]"
            ))
        })
}
