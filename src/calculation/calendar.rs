//! Calendar utilities: month enumeration, Sundays and public holidays.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Korean public holidays for 2024 and 2025, substitute and temporary
/// holidays included. 2025-05-05 is listed twice: Children's Day and
/// Buddha's Birthday fell on the same day.
pub const DEFAULT_HOLIDAYS: &[&str] = &[
    // 2024
    "2024-01-01",
    "2024-02-09",
    "2024-02-10",
    "2024-02-11",
    "2024-02-12",
    "2024-03-01",
    "2024-04-10",
    "2024-05-05",
    "2024-05-06",
    "2024-05-15",
    "2024-06-06",
    "2024-08-15",
    "2024-09-16",
    "2024-09-17",
    "2024-09-18",
    "2024-10-01",
    "2024-10-03",
    "2024-10-09",
    "2024-12-25",
    // 2025
    "2025-01-01",
    "2025-01-27",
    "2025-01-28",
    "2025-01-29",
    "2025-01-30",
    "2025-03-01",
    "2025-03-03",
    "2025-05-05",
    "2025-05-05",
    "2025-05-06",
    "2025-06-03",
    "2025-06-06",
    "2025-08-15",
    "2025-10-03",
    "2025-10-05",
    "2025-10-06",
    "2025-10-07",
    "2025-10-08",
    "2025-10-09",
    "2025-12-25",
];

static DEFAULT_HOLIDAY_SET: LazyLock<HashSet<NaiveDate>> = LazyLock::new(|| {
    DEFAULT_HOLIDAYS
        .iter()
        .filter_map(|s| parse_date(s).ok())
        .collect()
});

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| EngineError::InvalidDate {
        value: value.to_string(),
    })
}

/// A calendar month.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::YearMonth;
///
/// let february: YearMonth = "2024-02".parse().unwrap();
/// assert_eq!(february.days_in_month(), 29);
/// assert_eq!(february.to_string(), "2024-02");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    /// The year.
    pub year: i32,
    /// The month, 1 to 12.
    pub month: u32,
}

impl YearMonth {
    /// Creates a year-month, or `None` when the month is out of range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The given day of the month, if it exists.
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// Number of days in the month.
    pub fn days_in_month(&self) -> u32 {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        match (
            self.first_day(),
            NaiveDate::from_ymd_opt(next_year, next_month, 1),
        ) {
            (Some(first), Some(next)) => (next - first).num_days() as u32,
            _ => 0,
        }
    }
}

impl FromStr for YearMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidYearMonth {
            value: s.to_string(),
        };
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Number of days in a `YYYY-MM` month, or 0 when the input is malformed.
///
/// ```
/// use payroll_engine::calculation::get_days_in_month;
///
/// assert_eq!(get_days_in_month("2025-02"), 28);
/// assert_eq!(get_days_in_month("2025-12"), 31);
/// assert_eq!(get_days_in_month("2025-13"), 0);
/// ```
pub fn get_days_in_month(year_month: &str) -> u32 {
    year_month
        .parse::<YearMonth>()
        .map(|ym| ym.days_in_month())
        .unwrap_or(0)
}

/// Returns true if the given day of a `YYYY-MM` month is a Sunday.
///
/// Malformed months and days outside the month are never Sundays.
pub fn is_sunday_by_date(day: u32, year_month: &str) -> bool {
    year_month
        .parse::<YearMonth>()
        .ok()
        .and_then(|ym| ym.day(day))
        .is_some_and(|date| date.weekday() == Weekday::Sun)
}

/// Returns true if the date is in `holidays`, or in the default calendar
/// when no list is given.
pub fn is_holiday(date: NaiveDate, holidays: Option<&[NaiveDate]>) -> bool {
    match holidays {
        Some(list) => list.contains(&date),
        None => DEFAULT_HOLIDAY_SET.contains(&date),
    }
}

/// Returns true if the `YYYY-MM-DD` date is a holiday.
///
/// Malformed dates are never holidays.
///
/// ```
/// use payroll_engine::calculation::is_holiday_by_date;
///
/// assert!(is_holiday_by_date("2025-05-05", None));
/// assert!(!is_holiday_by_date("2025-05-07", None));
/// assert!(!is_holiday_by_date("not a date", None));
/// ```
pub fn is_holiday_by_date(date: &str, holidays: Option<&[NaiveDate]>) -> bool {
    parse_date(date).is_ok_and(|d| is_holiday(d, holidays))
}

/// Formats the report label for a date, e.g. `"3월 4일"`.
pub fn date_label(date: NaiveDate) -> String {
    format!("{}월 {}일", date.month(), date.day())
}

/// One day of a month with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarDay {
    /// The date.
    pub date: NaiveDate,
    /// Day of the month.
    pub day: u32,
    /// Day of the week.
    pub weekday: Weekday,
    /// The day is a Sunday.
    pub is_sunday: bool,
    /// The day is a public holiday.
    pub is_holiday: bool,
}

/// Enumerates every day of a `YYYY-MM` month.
///
/// ```
/// use payroll_engine::calculation::month_days;
///
/// let days = month_days("2025-10", None).unwrap();
/// assert_eq!(days.len(), 31);
/// assert!(days[5].is_holiday); // 2025-10-06, Chuseok
/// assert!(days[4].is_sunday);  // 2025-10-05
/// ```
pub fn month_days(
    year_month: &str,
    holidays: Option<&[NaiveDate]>,
) -> EngineResult<Vec<CalendarDay>> {
    let ym: YearMonth = year_month.parse()?;

    Ok((1..=ym.days_in_month())
        .filter_map(|day| ym.day(day))
        .map(|date| CalendarDay {
            date,
            day: date.day(),
            weekday: date.weekday(),
            is_sunday: date.weekday() == Weekday::Sun,
            is_holiday: is_holiday(date, holidays),
        })
        .collect())
}
