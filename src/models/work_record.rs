//! Work record model and related types.
//!
//! This module defines the [`WorkRecord`] struct for one day's work by one
//! worker, and [`WorkerRecords`] for the set of rows belonging to a worker.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::WorkTypeMetadata;

/// Whether the pay for a work record has been handed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Pay has been handed out.
    Paid,
    /// Pay is outstanding. Unknown status values also land here.
    #[default]
    #[serde(other)]
    Unpaid,
}

/// One day's work by one worker.
///
/// Money fields hold whole won. The four insurance contributions are computed
/// upstream (rate × wage, rounded) and carried in as plain inputs; income tax,
/// local tax and employment insurance are derived on demand by the
/// calculators in [`crate::calculation`].
///
/// Numeric fields deserialize leniently: numbers, numeric strings, `null`,
/// missing fields and unparseable values all become a number, with anything
/// unreadable treated as zero. A `null` or numeric id, a `null` status and
/// unreadable work-type flags are accepted the same way.
///
/// # Example
///
/// ```
/// use payroll_engine::models::WorkRecord;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record: WorkRecord = serde_json::from_str(
///     r#"{"work_date": "2025-03-04", "hours": "8", "daily_wage": 200000, "allowances": null}"#,
/// ).unwrap();
///
/// assert_eq!(record.work_date, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
/// assert_eq!(record.hours, Decimal::from(8));
/// assert_eq!(record.allowances, Decimal::ZERO);
/// assert_eq!(record.taxable_pay(), Decimal::from(200_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkRecord {
    /// Identifier of the stored row, used to match unsaved edits.
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    /// The calendar date worked.
    pub work_date: NaiveDate,
    /// Hours worked.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub hours: Decimal,
    /// Gross pay for the day before allowances and deductions.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub daily_wage: Decimal,
    /// Additional taxable pay (meal, overtime and similar allowances).
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub allowances: Decimal,
    /// Non-taxable portion of pay.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub tax_exemption: Decimal,
    /// Pre-computed national pension contribution.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub national_pension: Decimal,
    /// Pre-computed health insurance contribution.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub health_insurance: Decimal,
    /// Pre-computed industrial accident insurance contribution.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub industrial_accident: Decimal,
    /// Pre-computed long-term care insurance contribution.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub long_term_care: Decimal,
    /// Payment status of the day's pay.
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: PaymentStatus,
    /// Extended / holiday / night flags recorded for the day, as an object or
    /// as the stored JSON text.
    #[serde(default, deserialize_with = "lenient_work_type")]
    pub work_type: WorkTypeMetadata,
}

impl WorkRecord {
    /// Creates an unpaid record with the given date and daily wage and every
    /// other amount set to zero.
    pub fn new(work_date: NaiveDate, daily_wage: Decimal) -> Self {
        Self {
            id: String::new(),
            work_date,
            hours: Decimal::ZERO,
            daily_wage,
            allowances: Decimal::ZERO,
            tax_exemption: Decimal::ZERO,
            national_pension: Decimal::ZERO,
            health_insurance: Decimal::ZERO,
            industrial_accident: Decimal::ZERO,
            long_term_care: Decimal::ZERO,
            status: PaymentStatus::Unpaid,
            work_type: WorkTypeMetadata::default(),
        }
    }

    /// `daily_wage + allowances - tax_exemption`, without any floor.
    pub fn taxable_pay(&self) -> Decimal {
        self.daily_wage + self.allowances - self.tax_exemption
    }

    /// `daily_wage + allowances`.
    pub fn gross_pay(&self) -> Decimal {
        self.daily_wage + self.allowances
    }

    /// Returns true if the day's pay has been handed out.
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Folds another record for the same worker and day into this one.
    ///
    /// Every numeric field is summed. The merged status is unpaid if either
    /// side is unpaid, and the work-type flags are OR-ed together.
    pub fn merge(&mut self, other: &WorkRecord) {
        self.hours += other.hours;
        self.daily_wage += other.daily_wage;
        self.allowances += other.allowances;
        self.tax_exemption += other.tax_exemption;
        self.national_pension += other.national_pension;
        self.health_insurance += other.health_insurance;
        self.industrial_accident += other.industrial_accident;
        self.long_term_care += other.long_term_care;
        if !other.is_paid() {
            self.status = PaymentStatus::Unpaid;
        }
        self.work_type.extended |= other.work_type.extended;
        self.work_type.holiday |= other.work_type.holiday;
        self.work_type.night |= other.work_type.night;
    }
}

/// All work records of one worker for a reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRecords {
    /// Identifier of the worker.
    pub worker_id: String,
    /// Display name of the worker.
    #[serde(default)]
    pub name: String,
    /// The worker's records, in any order.
    #[serde(default)]
    pub records: Vec<WorkRecord>,
}

/// Reads a number from a JSON value, treating anything unreadable as zero.
///
/// Accepts JSON numbers and numeric strings (surrounding whitespace and
/// scientific notation allowed). `null`, booleans, arrays, objects and
/// non-numeric strings yield zero.
pub fn coerce_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => Decimal::ZERO,
    }
}

fn parse_decimal(s: &str) -> Decimal {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .unwrap_or(Decimal::ZERO)
}

fn lenient_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_decimal).unwrap_or(Decimal::ZERO))
}

fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<PaymentStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if s.trim() == "paid" => PaymentStatus::Paid,
        _ => PaymentStatus::Unpaid,
    })
}

fn lenient_work_type<'de, D>(deserializer: D) -> Result<WorkTypeMetadata, D::Error>
where
    D: Deserializer<'de>,
{
    let flags = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(stored)) if !stored.trim().is_empty() => {
            serde_json::from_str(&stored).unwrap_or_default()
        }
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => WorkTypeMetadata::default(),
    };
    Ok(flags)
}
