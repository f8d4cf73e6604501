//! Income tax and local tax for daily-wage workers.
//!
//! Daily-wage income tax is levied on the part of a day's pay above the daily
//! income deduction, at the income tax rate, reduced by the statutory tax
//! reduction. Amounts below the minimum collectable tax are not collected
//! at all ("소액부징수").

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::config::PayrollRates;
use crate::format::format_number;
use crate::models::WorkRecord;

/// Tax amounts below this many won are not collected.
pub const DEFAULT_MIN_TAX_EXEMPTION: Decimal = dec!(1000);

/// Rounds to whole won, halves away from zero.
///
/// ```
/// use payroll_engine::calculation::round_won;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(round_won(dec!(134.5)), dec!(135));
/// assert_eq!(round_won(dec!(134.49)), dec!(134));
/// ```
pub fn round_won(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// The result of a daily tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTaxResult {
    /// Income tax for the day.
    pub daily_tax: Decimal,
    /// Wage above the daily income deduction.
    pub daily_taxable_amount: Decimal,
    /// Human-readable working, e.g. `(200,000 - 150,000) × 6% × 45% = 1,350`.
    pub formula: String,
}

fn percent(rate: Decimal) -> String {
    (rate * dec!(100)).normalize().to_string()
}

/// Calculates one day's income tax from the daily wage alone.
///
/// The taxable amount is the wage above the daily income deduction, or zero
/// when the wage does not exceed it. The minimum collection rule is not
/// applied here.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_daily_tax;
/// use payroll_engine::config::PayrollRates;
/// use rust_decimal_macros::dec;
///
/// let result = calculate_daily_tax(dec!(200000), &PayrollRates::default());
/// assert_eq!(result.daily_taxable_amount, dec!(50000));
/// assert_eq!(result.daily_tax, dec!(1350));
/// assert_eq!(result.formula, "(200,000 - 150,000) × 6% × 45% = 1,350");
/// ```
pub fn calculate_daily_tax(daily_wage: Decimal, rates: &PayrollRates) -> DailyTaxResult {
    let deduction = rates.daily_income_deduction;

    if daily_wage <= deduction {
        return DailyTaxResult {
            daily_tax: Decimal::ZERO,
            daily_taxable_amount: Decimal::ZERO,
            formula: format!(
                "{} ≤ {} (no taxable amount) = 0",
                format_number(daily_wage),
                format_number(deduction)
            ),
        };
    }

    let taxable = (daily_wage - deduction).max(Decimal::ZERO);
    let tax = round_won(taxable * rates.income_tax_rate * rates.tax_reduction_rate);

    DailyTaxResult {
        daily_tax: tax,
        daily_taxable_amount: taxable,
        formula: format!(
            "({} - {}) × {}% × {}% = {}",
            format_number(daily_wage),
            format_number(deduction),
            percent(rates.income_tax_rate),
            percent(rates.tax_reduction_rate),
            format_number(tax)
        ),
    }
}

/// Zeroes a tax amount below the minimum collectable amount.
///
/// Amounts at or above the threshold are returned unchanged; nothing is
/// rounded.
///
/// ```
/// use payroll_engine::calculation::{apply_minimum_tax_rule, DEFAULT_MIN_TAX_EXEMPTION};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(apply_minimum_tax_rule(dec!(999), DEFAULT_MIN_TAX_EXEMPTION), dec!(0));
/// assert_eq!(apply_minimum_tax_rule(dec!(1000), DEFAULT_MIN_TAX_EXEMPTION), dec!(1000));
/// ```
pub fn apply_minimum_tax_rule(tax: Decimal, min_tax_exemption: Decimal) -> Decimal {
    if tax < min_tax_exemption {
        Decimal::ZERO
    } else {
        tax
    }
}

/// Calculates a record's income tax with the default rates.
///
/// See [`calculate_income_tax_with`].
pub fn calculate_income_tax(record: &WorkRecord) -> Decimal {
    calculate_income_tax_with(record, &PayrollRates::default())
}

/// Calculates a record's income tax.
///
/// The base is `daily_wage + allowances - tax_exemption`. Above the daily
/// income deduction the excess is taxed at the income tax rate times the
/// reduction rate, rounded to whole won, then zeroed if under the minimum
/// collectable tax. The result is never negative.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_income_tax;
/// use payroll_engine::models::WorkRecord;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
/// assert_eq!(calculate_income_tax(&WorkRecord::new(date, dec!(200000))), dec!(1350));
/// assert_eq!(calculate_income_tax(&WorkRecord::new(date, dec!(150000))), dec!(0));
/// ```
pub fn calculate_income_tax_with(record: &WorkRecord, rates: &PayrollRates) -> Decimal {
    let taxable_pay = record.taxable_pay();

    let tax = if taxable_pay > rates.daily_income_deduction {
        let tax = round_won(
            (taxable_pay - rates.daily_income_deduction)
                * rates.income_tax_rate
                * rates.tax_reduction_rate,
        );
        apply_minimum_tax_rule(tax, rates.min_tax_exemption)
    } else {
        Decimal::ZERO
    };

    tax.max(Decimal::ZERO)
}

/// Calculates local income tax with the default rate.
pub fn calculate_local_tax(income_tax: Decimal) -> Decimal {
    calculate_local_tax_with(income_tax, &PayrollRates::default())
}

/// Calculates local income tax as a rounded share of income tax.
///
/// ```
/// use payroll_engine::calculation::calculate_local_tax;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(calculate_local_tax(dec!(1350)), dec!(135));
/// assert_eq!(calculate_local_tax(dec!(1005)), dec!(101));
/// ```
pub fn calculate_local_tax_with(income_tax: Decimal, rates: &PayrollRates) -> Decimal {
    round_won(income_tax * rates.local_tax_rate)
}
