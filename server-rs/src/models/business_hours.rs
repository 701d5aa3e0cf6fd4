use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BusinessHoursRow {
    pub organization_id: Uuid,
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

/// Opening window for one weekday, local wall-clock. Weekdays use ISO
/// numbering: Monday = 1 .. Sunday = 7.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub organization_id: Uuid,
    pub weekday: u8,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl BusinessHours {
    pub fn new(
        organization_id: Uuid,
        weekday: u8,
        open: NaiveTime,
        close: NaiveTime,
    ) -> Result<Self, AppError> {
        if !(1..=7).contains(&weekday) {
            return Err(AppError::Validation(format!(
                "weekday must be between 1 and 7, got {weekday}"
            )));
        }
        if open >= close {
            return Err(AppError::Validation(format!(
                "opening time {open} must be before closing time {close}"
            )));
        }
        Ok(Self {
            organization_id,
            weekday,
            open,
            close,
        })
    }
}

pub fn weekday_of(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

impl TryFrom<BusinessHoursRow> for BusinessHours {
    type Error = AppError;

    fn try_from(row: BusinessHoursRow) -> Result<Self, Self::Error> {
        let weekday = u8::try_from(row.day_of_week).map_err(|_| {
            AppError::Validation(format!("invalid day_of_week {}", row.day_of_week))
        })?;
        BusinessHours::new(row.organization_id, weekday, row.open_time, row.close_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn iso_weekday_numbering() {
        // 2026-10-19 is a Monday, 2026-10-25 a Sunday.
        assert_eq!(weekday_of(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()), 1);
        assert_eq!(weekday_of(NaiveDate::from_ymd_opt(2026, 10, 25).unwrap()), 7);
    }

    #[test]
    fn rejects_inverted_or_out_of_range_rows() {
        let org = Uuid::new_v4();
        assert!(BusinessHours::new(org, 1, t(12, 0), t(9, 0)).is_err());
        assert!(BusinessHours::new(org, 1, t(9, 0), t(9, 0)).is_err());
        assert!(BusinessHours::new(org, 0, t(9, 0), t(12, 0)).is_err());
        assert!(BusinessHours::try_from(BusinessHoursRow {
            organization_id: org,
            day_of_week: -1,
            open_time: t(9, 0),
            close_time: t(12, 0),
        })
        .is_err());
        assert!(BusinessHours::new(org, 7, t(9, 0), t(12, 0)).is_ok());
    }
}
