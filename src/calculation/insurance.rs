//! Social insurance premiums and eligibility.
//!
//! Covers the four major insurances: national pension, health insurance
//! (with long-term care), employment insurance and industrial accident
//! insurance. Every premium is `round(wage × rate)` computed independently.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PayrollRates;
use crate::models::WorkRecord;

use super::daily_tax::round_won;

/// Calculates a record's employment insurance premium with the default rate.
///
/// See [`calculate_employment_insurance_with`].
pub fn calculate_employment_insurance(record: &WorkRecord) -> Decimal {
    calculate_employment_insurance_with(record, &PayrollRates::default())
}

/// Calculates a record's employment insurance premium.
///
/// The base is the taxable pay floored at zero.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_employment_insurance;
/// use payroll_engine::models::WorkRecord;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let record = WorkRecord::new(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), dec!(100000));
/// assert_eq!(calculate_employment_insurance(&record), dec!(900));
/// ```
pub fn calculate_employment_insurance_with(record: &WorkRecord, rates: &PayrollRates) -> Decimal {
    round_won(record.taxable_pay().max(Decimal::ZERO) * rates.employment_insurance_rate)
}

/// Which industrial accident rate applies to a site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccidentRateClass {
    /// The general rate.
    Base,
    /// The construction industry rate.
    #[default]
    Construction,
}

/// Premiums on one wage amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePremiums {
    /// National pension contribution.
    pub national_pension: Decimal,
    /// Health insurance contribution.
    pub health_insurance: Decimal,
    /// Long-term care contribution.
    pub long_term_care: Decimal,
    /// Employment insurance premium.
    pub employment_insurance: Decimal,
    /// Industrial accident contribution.
    pub industrial_accident: Decimal,
}

impl InsurancePremiums {
    /// Sum of every premium.
    pub fn total(&self) -> Decimal {
        self.national_pension
            + self.health_insurance
            + self.long_term_care
            + self.employment_insurance
            + self.industrial_accident
    }

    /// Zeroes the premiums the worker is not eligible for.
    ///
    /// Long-term care follows health insurance.
    pub fn masked(mut self, eligibility: &InsuranceEligibility) -> Self {
        if !eligibility.national_pension {
            self.national_pension = Decimal::ZERO;
        }
        if !eligibility.health_insurance {
            self.health_insurance = Decimal::ZERO;
            self.long_term_care = Decimal::ZERO;
        }
        if !eligibility.employment_insurance {
            self.employment_insurance = Decimal::ZERO;
        }
        if !eligibility.industrial_accident {
            self.industrial_accident = Decimal::ZERO;
        }
        self
    }
}

/// Calculates every premium on a wage, each rounded independently.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_insurance_premiums, AccidentRateClass};
/// use payroll_engine::config::PayrollRates;
/// use rust_decimal_macros::dec;
///
/// let premiums = calculate_insurance_premiums(
///     dec!(200000),
///     &PayrollRates::default(),
///     AccidentRateClass::Construction,
/// );
/// assert_eq!(premiums.national_pension, dec!(9000));
/// assert_eq!(premiums.health_insurance, dec!(7090));
/// assert_eq!(premiums.long_term_care, dec!(918));
/// assert_eq!(premiums.employment_insurance, dec!(1800));
/// assert_eq!(premiums.industrial_accident, dec!(7000));
/// ```
pub fn calculate_insurance_premiums(
    wage: Decimal,
    rates: &PayrollRates,
    accident_class: AccidentRateClass,
) -> InsurancePremiums {
    let base = wage.max(Decimal::ZERO);
    let accident_rate = match accident_class {
        AccidentRateClass::Base => rates.industrial_accident_base_rate,
        AccidentRateClass::Construction => rates.industrial_accident_construction_rate,
    };

    InsurancePremiums {
        national_pension: round_won(base * rates.national_pension_rate),
        health_insurance: round_won(base * rates.health_insurance_rate),
        long_term_care: round_won(base * rates.long_term_care_rate),
        employment_insurance: round_won(base * rates.employment_insurance_rate),
        industrial_accident: round_won(base * accident_rate),
    }
}

/// A worker's month, as far as insurance eligibility is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityInput {
    /// International age, when known. Unknown ages pass the age limits.
    pub age: Option<u32>,
    /// Days worked in the month.
    pub work_days: u32,
    /// Hours worked in the month.
    pub work_hours: Decimal,
    /// Total pay for the month.
    pub monthly_wage: Decimal,
}

/// Which insurances apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceEligibility {
    /// National pension applies.
    pub national_pension: bool,
    /// Health insurance (and long-term care) applies.
    pub health_insurance: bool,
    /// Employment insurance applies.
    pub employment_insurance: bool,
    /// Industrial accident insurance applies.
    pub industrial_accident: bool,
}

/// Decides which insurances apply to a daily worker for a month.
///
/// - Health insurance: at least the threshold work days or work hours.
/// - National pension: under the pension age limit, and the health criteria
///   or at least the pension wage threshold.
/// - Employment insurance: under the employment insurance age limit.
/// - Industrial accident insurance: always.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{assess_insurance_eligibility, EligibilityInput};
/// use payroll_engine::config::PayrollRates;
/// use rust_decimal_macros::dec;
///
/// let input = EligibilityInput {
///     age: Some(45),
///     work_days: 5,
///     work_hours: dec!(40),
///     monthly_wage: dec!(1000000),
/// };
/// let eligibility = assess_insurance_eligibility(&input, &PayrollRates::default());
/// assert!(!eligibility.national_pension);
/// assert!(!eligibility.health_insurance);
/// assert!(eligibility.employment_insurance);
/// ```
pub fn assess_insurance_eligibility(
    input: &EligibilityInput,
    rates: &PayrollRates,
) -> InsuranceEligibility {
    let thresholds = &rates.thresholds;
    let under = |limit: Decimal| input.age.is_none_or(|age| Decimal::from(age) < limit);

    let regular_worker = Decimal::from(input.work_days) >= thresholds.work_days
        || input.work_hours >= thresholds.work_hours;

    InsuranceEligibility {
        national_pension: under(thresholds.pension_age_limit)
            && (regular_worker || input.monthly_wage >= thresholds.pension_wage_threshold),
        health_insurance: regular_worker,
        employment_insurance: under(thresholds.employment_insurance_age_limit),
        industrial_accident: true,
    }
}

/// Derives international age from a resident registration number.
///
/// The first six digits are the birth date (`YYMMDD`); the seventh gives the
/// century (1, 2, 5, 6 for the 1900s; 3, 4, 7, 8 for the 2000s; 9, 0 for the
/// 1800s). Hyphens and spaces are ignored. Returns `None` for malformed
/// numbers and for birth dates after `as_of`.
///
/// ```
/// use payroll_engine::calculation::age_from_resident_number;
/// use chrono::NaiveDate;
///
/// let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// assert_eq!(age_from_resident_number("650301-1234567", as_of), Some(60));
/// assert_eq!(age_from_resident_number("650302-1234567", as_of), Some(59));
/// assert_eq!(age_from_resident_number("050101-3234567", as_of), Some(20));
/// ```
pub fn age_from_resident_number(resident_number: &str, as_of: NaiveDate) -> Option<u32> {
    let digits: Vec<u32> = resident_number
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_digit(10))
        .collect::<Option<Vec<_>>>()?;

    if digits.len() < 7 {
        return None;
    }

    let century = match digits[6] {
        1 | 2 | 5 | 6 => 1900,
        3 | 4 | 7 | 8 => 2000,
        _ => 1800,
    };
    let year = century + (digits[0] * 10 + digits[1]) as i32;
    let month = digits[2] * 10 + digits[3];
    let day = digits[4] * 10 + digits[5];
    let birth = NaiveDate::from_ymd_opt(year, month, day)?;

    if birth > as_of {
        return None;
    }

    let before_birthday = (as_of.month(), as_of.day()) < (birth.month(), birth.day());
    let age = as_of.year() - birth.year() - i32::from(before_birthday);
    u32::try_from(age).ok()
}
