use std::fmt;

use chrono::{Datelike, Local, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// A calendar month, exchanged on the wire as `month * 10000 + year`
/// (October 2026 is `102026`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct MonthYear(NaiveDate);

impl MonthYear {
    pub fn new(month: u32, year: i32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(invalid_code(i64::from(month) * 10_000 + i64::from(year)));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| invalid_code(i64::from(month) * 10_000 + i64::from(year)))
    }

    /// Decodes the `month * 10000 + year` integer form.
    pub fn from_code(code: i64) -> Result<Self> {
        if code <= 0 {
            return Err(invalid_code(code));
        }
        let month = u32::try_from(code / 10_000).map_err(|_| invalid_code(code))?;
        let year = i32::try_from(code % 10_000).map_err(|_| invalid_code(code))?;
        Self::new(month, year).map_err(|_| invalid_code(code))
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// The month containing [`local_today`].
    pub fn current() -> Self {
        Self::from_date(local_today())
    }

    pub fn code(&self) -> i64 {
        i64::from(self.0.month()) * 10_000 + i64::from(self.0.year())
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn next_month_first_day(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next_month_first_day().pred_opt().unwrap_or(self.0)
    }

    /// Half-open range `[first day, first day of next month)`.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        (self.first_day(), self.next_month_first_day())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let (start, end) = self.date_range();
        date >= start && date < end
    }
}

/// Today's date on the host clock. Every "today" in the worker comes from here.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn invalid_code(code: i64) -> Error {
    Error::Validation(ValidationError::InvalidMonthYear(code))
}

impl TryFrom<i64> for MonthYear {
    type Error = Error;

    fn try_from(code: i64) -> Result<Self> {
        Self::from_code(code)
    }
}

impl From<MonthYear> for i64 {
    fn from(value: MonthYear) -> Self {
        value.code()
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{}", self.month(), self.year())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_month_and_year() {
        let my = MonthYear::from_code(102026).unwrap();
        assert_eq!(my.month(), 10);
        assert_eq!(my.year(), 2026);
        assert_eq!(my.code(), 102026);
        assert_eq!(my.to_string(), "10/2026");
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(MonthYear::from_code(132026).is_err());
        assert!(MonthYear::from_code(2026).is_err());
        assert!(MonthYear::from_code(-12026).is_err());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let my = MonthYear::new(12, 2025).unwrap();
        let (start, end) = my.date_range();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(my.last_day(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn leap_february_last_day() {
        let my = MonthYear::new(2, 2028).unwrap();
        assert_eq!(my.last_day(), NaiveDate::from_ymd_opt(2028, 2, 29).unwrap());
        assert!(my.contains(NaiveDate::from_ymd_opt(2028, 2, 29).unwrap()));
        assert!(!my.contains(NaiveDate::from_ymd_opt(2028, 3, 1).unwrap()));
    }

    #[test]
    fn serializes_as_integer_code() {
        let my = MonthYear::new(3, 2026).unwrap();
        assert_eq!(serde_json::to_string(&my).unwrap(), "32026");
        let back: MonthYear = serde_json::from_str("32026").unwrap();
        assert_eq!(back, my);
        assert!(serde_json::from_str::<MonthYear>("0").is_err());
    }

    #[test]
    fn current_month_follows_the_local_clock() {
        let before = MonthYear::from_date(local_today());
        let current = MonthYear::current();
        let after = MonthYear::from_date(local_today());
        assert!(current == before || current == after);
    }
}
