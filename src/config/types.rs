//! Rate configuration types.
//!
//! This module contains the time-versioned [`RateRow`] as stored by the rate
//! source, the fixed list of [`RateKey`]s with their static defaults, and the
//! resolved [`PayrollRates`] snapshot that calculators consume.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Category of tax rates.
pub const CATEGORY_TAX: &str = "tax";
/// Category of insurance rates.
pub const CATEGORY_INSURANCE: &str = "insurance";
/// Category of eligibility thresholds.
pub const CATEGORY_THRESHOLD: &str = "threshold";

/// A stored rate value: numeric for rates and thresholds, text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateValue {
    /// A numeric rate, amount or threshold.
    Number(Decimal),
    /// A free-form text setting.
    Text(String),
}

impl RateValue {
    /// Returns the value as a decimal, parsing text values when possible.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            RateValue::Number(n) => Some(*n),
            RateValue::Text(s) => Decimal::from_str(s.trim()).ok(),
        }
    }
}

impl From<Decimal> for RateValue {
    fn from(value: Decimal) -> Self {
        RateValue::Number(value)
    }
}

/// One time-versioned row of the rate table.
///
/// A row is active on a date when `effective_from <= date` and
/// `effective_to` is open or `>= date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateRow {
    /// The rate category (e.g. "tax").
    pub category: String,
    /// The key within the category (e.g. "income_tax_rate").
    pub key: String,
    /// The stored value.
    pub value: RateValue,
    /// First day the row applies.
    pub effective_from: NaiveDate,
    /// Last day the row applies, or open-ended.
    #[serde(default)]
    pub effective_to: Option<NaiveDate>,
}

impl RateRow {
    /// Returns true if the row applies on the given date.
    ///
    /// ```
    /// use payroll_engine::config::{RateRow, RateValue};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let row = RateRow {
    ///     category: "tax".to_string(),
    ///     key: "income_tax_rate".to_string(),
    ///     value: RateValue::Number(Decimal::new(6, 2)),
    ///     effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    ///     effective_to: Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()),
    /// };
    /// assert!(row.is_active_on(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
    /// assert!(!row.is_active_on(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    /// ```
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && self.effective_to.is_none_or(|to| to >= date)
    }

    /// Returns true if the row belongs to the given category and key.
    pub fn matches(&self, category: &str, key: &str) -> bool {
        self.category == category && self.key == key
    }
}

/// Selects the active row for a category and key as of a date.
///
/// Among the rows active on `as_of`, the one with the latest
/// `effective_from` wins.
pub fn select_active_row<'a>(
    rows: &'a [RateRow],
    category: &str,
    key: &str,
    as_of: NaiveDate,
) -> Option<&'a RateRow> {
    rows.iter()
        .filter(|row| row.matches(category, key) && row.is_active_on(as_of))
        .max_by_key(|row| row.effective_from)
}

/// The fixed list of rates the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateKey {
    /// Income tax rate on the daily taxable amount.
    IncomeTaxRate,
    /// Local income tax as a share of income tax.
    LocalTaxRate,
    /// Statutory reduction applied to daily-wage income tax.
    TaxReductionRate,
    /// Tax amounts below this are not collected.
    MinTaxExemption,
    /// Daily income deduction for daily-wage workers.
    DailyIncomeDeduction,
    /// Employee share of national pension.
    NationalPensionEmployeeRate,
    /// Employee share of health insurance.
    HealthInsuranceEmployeeRate,
    /// Long-term care insurance rate on wage.
    LongTermCareRate,
    /// Employment insurance (unemployment benefit) rate.
    EmploymentInsuranceUnemploymentRate,
    /// General industrial accident insurance rate.
    IndustrialAccidentBaseRate,
    /// Industrial accident insurance rate for construction.
    IndustrialAccidentConstructionRate,
    /// Monthly work days that trigger insurance eligibility.
    WorkDays,
    /// Monthly work hours that trigger insurance eligibility.
    WorkHours,
    /// Age from which national pension no longer applies.
    PensionAgeLimit,
    /// Monthly wage that triggers national pension on its own.
    PensionWageThreshold,
    /// Age from which employment insurance no longer applies.
    EmploymentInsuranceAgeLimit,
}

impl RateKey {
    /// Every key, in the order batch lookups resolve them.
    pub const ALL: [RateKey; 16] = [
        RateKey::IncomeTaxRate,
        RateKey::LocalTaxRate,
        RateKey::TaxReductionRate,
        RateKey::MinTaxExemption,
        RateKey::DailyIncomeDeduction,
        RateKey::NationalPensionEmployeeRate,
        RateKey::HealthInsuranceEmployeeRate,
        RateKey::LongTermCareRate,
        RateKey::EmploymentInsuranceUnemploymentRate,
        RateKey::IndustrialAccidentBaseRate,
        RateKey::IndustrialAccidentConstructionRate,
        RateKey::WorkDays,
        RateKey::WorkHours,
        RateKey::PensionAgeLimit,
        RateKey::PensionWageThreshold,
        RateKey::EmploymentInsuranceAgeLimit,
    ];

    /// The category this key is stored under.
    pub fn category(&self) -> &'static str {
        match self {
            RateKey::IncomeTaxRate
            | RateKey::LocalTaxRate
            | RateKey::TaxReductionRate
            | RateKey::MinTaxExemption
            | RateKey::DailyIncomeDeduction => CATEGORY_TAX,
            RateKey::NationalPensionEmployeeRate
            | RateKey::HealthInsuranceEmployeeRate
            | RateKey::LongTermCareRate
            | RateKey::EmploymentInsuranceUnemploymentRate
            | RateKey::IndustrialAccidentBaseRate
            | RateKey::IndustrialAccidentConstructionRate => CATEGORY_INSURANCE,
            RateKey::WorkDays
            | RateKey::WorkHours
            | RateKey::PensionAgeLimit
            | RateKey::PensionWageThreshold
            | RateKey::EmploymentInsuranceAgeLimit => CATEGORY_THRESHOLD,
        }
    }

    /// The stored key name.
    pub fn key(&self) -> &'static str {
        match self {
            RateKey::IncomeTaxRate => "income_tax_rate",
            RateKey::LocalTaxRate => "local_tax_rate",
            RateKey::TaxReductionRate => "tax_reduction_rate",
            RateKey::MinTaxExemption => "min_tax_exemption",
            RateKey::DailyIncomeDeduction => "daily_income_deduction",
            RateKey::NationalPensionEmployeeRate => "national_pension_employee_rate",
            RateKey::HealthInsuranceEmployeeRate => "health_insurance_employee_rate",
            RateKey::LongTermCareRate => "long_term_care_rate",
            RateKey::EmploymentInsuranceUnemploymentRate => {
                "employment_insurance_unemployment_rate"
            }
            RateKey::IndustrialAccidentBaseRate => "industrial_accident_base_rate",
            RateKey::IndustrialAccidentConstructionRate => "industrial_accident_construction_rate",
            RateKey::WorkDays => "work_days",
            RateKey::WorkHours => "work_hours",
            RateKey::PensionAgeLimit => "pension_age_limit",
            RateKey::PensionWageThreshold => "pension_wage_threshold",
            RateKey::EmploymentInsuranceAgeLimit => "employment_insurance_age_limit",
        }
    }

    /// The static fallback used when no stored row is active.
    pub fn default_value(&self) -> Decimal {
        match self {
            RateKey::IncomeTaxRate => dec!(0.06),
            RateKey::LocalTaxRate => dec!(0.10),
            RateKey::TaxReductionRate => dec!(0.45),
            RateKey::MinTaxExemption => dec!(1000),
            RateKey::DailyIncomeDeduction => dec!(150000),
            RateKey::NationalPensionEmployeeRate => dec!(0.045),
            RateKey::HealthInsuranceEmployeeRate => dec!(0.03545),
            RateKey::LongTermCareRate => dec!(0.004591),
            RateKey::EmploymentInsuranceUnemploymentRate => dec!(0.009),
            RateKey::IndustrialAccidentBaseRate => dec!(0.006),
            RateKey::IndustrialAccidentConstructionRate => dec!(0.035),
            RateKey::WorkDays => dec!(8),
            RateKey::WorkHours => dec!(60),
            RateKey::PensionAgeLimit => dec!(60),
            RateKey::PensionWageThreshold => dec!(2200000),
            RateKey::EmploymentInsuranceAgeLimit => dec!(65),
        }
    }

    /// Finds the key stored under a category and key name.
    pub fn lookup(category: &str, key: &str) -> Option<RateKey> {
        Self::ALL
            .into_iter()
            .find(|k| k.category() == category && k.key() == key)
    }
}

/// Monthly thresholds that decide which insurances apply to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityThresholds {
    /// Work days per month (default 8).
    pub work_days: Decimal,
    /// Work hours per month (default 60).
    pub work_hours: Decimal,
    /// National pension stops applying at this age (default 60).
    pub pension_age_limit: Decimal,
    /// Monthly wage that brings in national pension on its own (default 2,200,000).
    pub pension_wage_threshold: Decimal,
    /// Employment insurance stops applying at this age (default 65).
    pub employment_insurance_age_limit: Decimal,
}

/// A resolved, validated set of rates for one calculation pass.
///
/// Built once at the boundary by
/// [`RateProvider::resolve_rates`](super::RateProvider::resolve_rates) or from
/// a raw rate map with [`PayrollRates::from_resolved`]; calculators read the
/// named fields directly. `Default` gives the statutory fallback values.
///
/// # Example
///
/// ```
/// use payroll_engine::config::PayrollRates;
/// use rust_decimal::Decimal;
///
/// let rates = PayrollRates::default();
/// assert_eq!(rates.daily_income_deduction, Decimal::from(150_000));
/// assert_eq!(rates.thresholds.work_days, Decimal::from(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRates {
    /// Income tax rate (default 0.06).
    pub income_tax_rate: Decimal,
    /// Local tax as a share of income tax (default 0.10).
    pub local_tax_rate: Decimal,
    /// Daily-wage tax reduction (default 0.45).
    pub tax_reduction_rate: Decimal,
    /// Minimum collectable tax (default 1000).
    pub min_tax_exemption: Decimal,
    /// Daily income deduction (default 150,000).
    pub daily_income_deduction: Decimal,
    /// Employee national pension rate (default 0.045).
    pub national_pension_rate: Decimal,
    /// Employee health insurance rate (default 0.03545).
    pub health_insurance_rate: Decimal,
    /// Long-term care rate on wage (default 0.004591).
    pub long_term_care_rate: Decimal,
    /// Employment insurance rate (default 0.009).
    pub employment_insurance_rate: Decimal,
    /// General industrial accident rate (default 0.006).
    pub industrial_accident_base_rate: Decimal,
    /// Construction industrial accident rate (default 0.035).
    pub industrial_accident_construction_rate: Decimal,
    /// Insurance eligibility thresholds.
    pub thresholds: EligibilityThresholds,
}

impl Default for PayrollRates {
    fn default() -> Self {
        Self::from_resolved(&HashMap::new())
    }
}

impl PayrollRates {
    /// Builds a rate set from resolved values, filling gaps with defaults.
    ///
    /// Values that are present but not numeric are logged and replaced by
    /// the default for that key.
    pub fn from_resolved(values: &HashMap<RateKey, RateValue>) -> Self {
        let get = |key: RateKey| match values.get(&key) {
            None => key.default_value(),
            Some(value) => value.as_decimal().unwrap_or_else(|| {
                warn!(
                    category = key.category(),
                    key = key.key(),
                    value = ?value,
                    "Non-numeric rate value, using default"
                );
                key.default_value()
            }),
        };

        Self {
            income_tax_rate: get(RateKey::IncomeTaxRate),
            local_tax_rate: get(RateKey::LocalTaxRate),
            tax_reduction_rate: get(RateKey::TaxReductionRate),
            min_tax_exemption: get(RateKey::MinTaxExemption),
            daily_income_deduction: get(RateKey::DailyIncomeDeduction),
            national_pension_rate: get(RateKey::NationalPensionEmployeeRate),
            health_insurance_rate: get(RateKey::HealthInsuranceEmployeeRate),
            long_term_care_rate: get(RateKey::LongTermCareRate),
            employment_insurance_rate: get(RateKey::EmploymentInsuranceUnemploymentRate),
            industrial_accident_base_rate: get(RateKey::IndustrialAccidentBaseRate),
            industrial_accident_construction_rate: get(
                RateKey::IndustrialAccidentConstructionRate,
            ),
            thresholds: EligibilityThresholds {
                work_days: get(RateKey::WorkDays),
                work_hours: get(RateKey::WorkHours),
                pension_age_limit: get(RateKey::PensionAgeLimit),
                pension_wage_threshold: get(RateKey::PensionWageThreshold),
                employment_insurance_age_limit: get(RateKey::EmploymentInsuranceAgeLimit),
            },
        }
    }
}

/// Rate file structure (`rates.yaml`).
#[derive(Debug, Clone, Deserialize)]
pub struct RatesFile {
    /// All stored rate rows.
    pub rates: Vec<RateRow>,
    /// Public holidays replacing the built-in calendar, when present.
    #[serde(default)]
    pub holidays: Option<Vec<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(value: Decimal, from: NaiveDate, to: Option<NaiveDate>) -> RateRow {
        RateRow {
            category: CATEGORY_TAX.to_string(),
            key: "income_tax_rate".to_string(),
            value: RateValue::Number(value),
            effective_from: from,
            effective_to: to,
        }
    }

    #[test]
    fn test_select_active_row_prefers_latest_effective_from() {
        let rows = vec![
            row(dec!(0.05), date(2023, 1, 1), None),
            row(dec!(0.06), date(2024, 1, 1), None),
            row(dec!(0.07), date(2026, 1, 1), None),
        ];

        let selected = select_active_row(&rows, "tax", "income_tax_rate", date(2025, 6, 1));
        assert_eq!(selected.unwrap().value, RateValue::Number(dec!(0.06)));
    }

    #[test]
    fn test_select_active_row_skips_expired_rows() {
        let rows = vec![
            row(dec!(0.05), date(2023, 1, 1), None),
            row(dec!(0.06), date(2024, 1, 1), Some(date(2024, 12, 31))),
        ];

        let selected = select_active_row(&rows, "tax", "income_tax_rate", date(2025, 1, 1));
        assert_eq!(selected.unwrap().value, RateValue::Number(dec!(0.05)));
    }

    #[test]
    fn test_select_active_row_none_before_first_row() {
        let rows = vec![row(dec!(0.06), date(2024, 1, 1), None)];
        assert!(select_active_row(&rows, "tax", "income_tax_rate", date(2020, 1, 1)).is_none());
        assert!(select_active_row(&rows, "tax", "local_tax_rate", date(2025, 1, 1)).is_none());
    }

    #[test]
    fn test_rate_key_lookup_round_trips_names() {
        for key in RateKey::ALL {
            assert_eq!(RateKey::lookup(key.category(), key.key()), Some(key));
        }
        assert_eq!(RateKey::lookup("tax", "unknown"), None);
    }

    #[test]
    fn test_defaults_match_statutory_values() {
        let rates = PayrollRates::default();
        assert_eq!(rates.income_tax_rate, dec!(0.06));
        assert_eq!(rates.local_tax_rate, dec!(0.10));
        assert_eq!(rates.tax_reduction_rate, dec!(0.45));
        assert_eq!(rates.min_tax_exemption, dec!(1000));
        assert_eq!(rates.national_pension_rate, dec!(0.045));
        assert_eq!(rates.health_insurance_rate, dec!(0.03545));
        assert_eq!(rates.long_term_care_rate, dec!(0.004591));
        assert_eq!(rates.employment_insurance_rate, dec!(0.009));
        assert_eq!(rates.industrial_accident_base_rate, dec!(0.006));
        assert_eq!(rates.industrial_accident_construction_rate, dec!(0.035));
        assert_eq!(rates.thresholds.work_hours, dec!(60));
        assert_eq!(rates.thresholds.pension_age_limit, dec!(60));
        assert_eq!(rates.thresholds.pension_wage_threshold, dec!(2200000));
        assert_eq!(rates.thresholds.employment_insurance_age_limit, dec!(65));
    }

    #[test]
    fn test_from_resolved_overrides_and_falls_back() {
        let mut values = HashMap::new();
        values.insert(RateKey::IncomeTaxRate, RateValue::Number(dec!(0.055)));
        values.insert(RateKey::LocalTaxRate, RateValue::Text("ten percent".to_string()));
        values.insert(RateKey::WorkDays, RateValue::Text("10".to_string()));

        let rates = PayrollRates::from_resolved(&values);
        assert_eq!(rates.income_tax_rate, dec!(0.055));
        assert_eq!(rates.local_tax_rate, dec!(0.10));
        assert_eq!(rates.thresholds.work_days, dec!(10));
    }

    #[test]
    fn test_rate_value_deserializes_number_or_text() {
        let number: RateValue = serde_yaml::from_str("0.045").unwrap();
        assert_eq!(number.as_decimal(), Some(dec!(0.045)));

        let text: RateValue = serde_yaml::from_str("monthly").unwrap();
        assert_eq!(text, RateValue::Text("monthly".to_string()));
        assert_eq!(text.as_decimal(), None);
    }
}
