//! Calendar month a goal applies to.

use chrono::{DateTime, Months, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Validation failures for [`GoalPeriod`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GoalPeriodError {
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),
    #[error("year must be between 1 and 9999, got {0}")]
    YearOutOfRange(i64),
}

/// A `(month, year)` pair.
///
/// # Examples
/// ```
/// use prodtrack::domain::GoalPeriod;
///
/// let june = GoalPeriod::new(6, 2025).expect("valid period");
/// assert_eq!(june.last_day().to_string(), "2025-06-30");
/// assert!(GoalPeriod::new(13, 2025).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GoalPeriod {
    month: u32,
    year: i32,
}

impl GoalPeriod {
    /// Validate raw month and year values.
    pub fn new(month: i64, year: i64) -> Result<Self, GoalPeriodError> {
        let month_checked = u32::try_from(month)
            .ok()
            .filter(|m| (1..=12).contains(m))
            .ok_or(GoalPeriodError::MonthOutOfRange(month))?;
        let year_checked = i32::try_from(year)
            .ok()
            .filter(|y| (1..=9999).contains(y))
            .ok_or(GoalPeriodError::YearOutOfRange(year))?;
        Ok(Self {
            month: month_checked,
            year: year_checked,
        })
    }

    /// Calendar month, 1-12.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// First calendar day of the month.
    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        // Month and year were range-checked in `new`.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the month.
    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        self.next_month_start()
            .pred_opt()
            .unwrap_or_else(|| self.first_day())
    }

    /// Half-open instant window `[start, end)` in UTC covering the month.
    #[must_use]
    pub fn instant_range(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.first_day().and_time(NaiveTime::MIN).and_utc(),
            self.next_month_start().and_time(NaiveTime::MIN).and_utc(),
        )
    }

    fn next_month_start(&self) -> NaiveDate {
        self.first_day()
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(0, 2025)]
    #[case(13, 2025)]
    #[case(-1, 2025)]
    fn rejects_bad_months(#[case] month: i64, #[case] year: i64) {
        assert_eq!(
            GoalPeriod::new(month, year),
            Err(GoalPeriodError::MonthOutOfRange(month))
        );
    }

    #[rstest]
    #[case(0)]
    #[case(10_000)]
    fn rejects_bad_years(#[case] year: i64) {
        assert_eq!(
            GoalPeriod::new(1, year),
            Err(GoalPeriodError::YearOutOfRange(year))
        );
    }

    #[rstest]
    #[case(2, 2024, "2024-02-29")]
    #[case(2, 2025, "2025-02-28")]
    #[case(12, 2025, "2025-12-31")]
    fn last_day_handles_month_lengths(#[case] month: i64, #[case] year: i64, #[case] expected: &str) {
        let period = GoalPeriod::new(month, year).expect("valid period");
        assert_eq!(period.last_day().to_string(), expected);
    }

    #[rstest]
    fn instant_range_is_half_open_over_the_month() {
        let period = GoalPeriod::new(12, 2025).expect("valid period");
        let (start, end) = period.instant_range();
        assert_eq!(Some(start), Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).single());
        assert_eq!(Some(end), Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).single());
    }
}
