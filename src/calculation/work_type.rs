//! Work-type classification.
//!
//! Two representations live side by side: a single [`WorkType`] tag picked by
//! priority, and the three independent flags of [`WorkTypeMetadata`] stored as
//! JSON text alongside a record.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::models::{WorkRecord, WorkType, WorkTypeMetadata};

use super::calendar::{YearMonth, is_holiday};

/// Classifies a day of a `YYYY-MM` month using the built-in holiday calendar.
///
/// Priority is holiday-or-Sunday, then night, then overtime, then regular.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::determine_work_type;
/// use payroll_engine::models::WorkType;
///
/// // 2025-03-03 is a substitute holiday
/// assert_eq!(determine_work_type(3, "2025-03", true, true), WorkType::Holiday);
/// assert_eq!(determine_work_type(4, "2025-03", true, true), WorkType::Night);
/// assert_eq!(determine_work_type(4, "2025-03", true, false), WorkType::Overtime);
/// assert_eq!(determine_work_type(4, "2025-03", false, false), WorkType::Regular);
/// ```
pub fn determine_work_type(
    day: u32,
    year_month: &str,
    is_extended: bool,
    is_night: bool,
) -> WorkType {
    determine_work_type_with(day, year_month, is_extended, is_night, None)
}

/// Classifies a day of a `YYYY-MM` month against the given holiday list.
///
/// A malformed month or a day outside it is never a holiday.
pub fn determine_work_type_with(
    day: u32,
    year_month: &str,
    is_extended: bool,
    is_night: bool,
    holidays: Option<&[NaiveDate]>,
) -> WorkType {
    let date = year_month
        .parse::<YearMonth>()
        .ok()
        .and_then(|ym| ym.day(day));

    let metadata = WorkTypeMetadata {
        extended: is_extended,
        holiday: date.is_some_and(|d| is_rest_day(d, holidays)),
        night: is_night,
    };
    metadata.primary_work_type()
}

/// Sundays and public holidays.
fn is_rest_day(date: NaiveDate, holidays: Option<&[NaiveDate]>) -> bool {
    date.weekday() == Weekday::Sun || is_holiday(date, holidays)
}

/// Serializes the three work-type flags to their stored JSON form.
///
/// ```
/// use payroll_engine::calculation::create_work_type_metadata;
///
/// assert_eq!(
///     create_work_type_metadata(true, false, true),
///     r#"{"extended":true,"holiday":false,"night":true}"#
/// );
/// ```
pub fn create_work_type_metadata(extended: bool, holiday: bool, night: bool) -> String {
    let metadata = WorkTypeMetadata {
        extended,
        holiday,
        night,
    };
    // A struct of three bools always serializes.
    serde_json::to_string(&metadata).unwrap_or_default()
}

/// Parses stored work-type flags. Anything unreadable yields all-false flags.
///
/// ```
/// use payroll_engine::calculation::parse_work_type_metadata;
/// use payroll_engine::models::WorkTypeMetadata;
///
/// let flags = parse_work_type_metadata(r#"{"holiday": true}"#);
/// assert!(flags.holiday && !flags.night && !flags.extended);
///
/// assert_eq!(parse_work_type_metadata("garbage"), WorkTypeMetadata::default());
/// ```
pub fn parse_work_type_metadata(stored: &str) -> WorkTypeMetadata {
    if stored.trim().is_empty() {
        return WorkTypeMetadata::default();
    }
    serde_json::from_str(stored).unwrap_or_else(|err| {
        debug!(error = %err, "Unreadable work type metadata, using defaults");
        WorkTypeMetadata::default()
    })
}

/// Sets a record's holiday flag from its date and returns the resulting tag.
///
/// The extended and night flags are left as recorded; a holiday flag already
/// set on the record is kept.
pub fn annotate_record(record: &mut WorkRecord, holidays: Option<&[NaiveDate]>) -> WorkType {
    record.work_type.holiday |= is_rest_day(record.work_date, holidays);
    record.work_type.primary_work_type()
}
