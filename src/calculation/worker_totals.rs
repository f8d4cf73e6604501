//! Day-by-day worker totals.
//!
//! This is the path used for monthly payroll statements: records are folded
//! per date, each date's wage is taxed on its own, and the minimum collection
//! rule is applied once to the worker's total tax. Insurance premiums are
//! computed on the total wage rather than taken from the records.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::PayrollRates;
use crate::models::{DailyTaxLine, WorkRecord, WorkerTotals};

use super::daily_tax::{apply_minimum_tax_rule, calculate_daily_tax, round_won};

/// Computes a worker's totals from daily wages alone.
///
/// Allowances and tax exemptions on the records are not considered.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_worker_totals;
/// use payroll_engine::config::PayrollRates;
/// use payroll_engine::models::WorkRecord;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let records = vec![
///     WorkRecord::new(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), dec!(200000)),
///     WorkRecord::new(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(), dec!(200000)),
/// ];
/// let totals = calculate_worker_totals(&records, &PayrollRates::default());
///
/// assert_eq!(totals.total_days, 2);
/// assert_eq!(totals.income_tax, dec!(2700));
/// assert_eq!(totals.local_tax, dec!(270));
/// ```
pub fn calculate_worker_totals(records: &[WorkRecord], rates: &PayrollRates) -> WorkerTotals {
    let mut by_date: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    for record in records {
        let (wage, hours) = by_date.entry(record.work_date).or_default();
        *wage += record.daily_wage;
        *hours += record.hours;
    }

    let mut totals = WorkerTotals {
        total_days: by_date.len(),
        ..Default::default()
    };
    let mut summed_tax = Decimal::ZERO;

    for (date, (wage, hours)) in by_date {
        let day = calculate_daily_tax(wage, rates);

        totals.total_wage += wage;
        totals.total_hours += hours;
        totals.total_taxable_amount += day.daily_taxable_amount;
        summed_tax += day.daily_tax;

        totals.daily.push(DailyTaxLine {
            date,
            wage,
            taxable_amount: day.daily_taxable_amount,
            daily_tax: day.daily_tax,
            formula: day.formula,
        });
    }

    totals.income_tax = apply_minimum_tax_rule(summed_tax, rates.min_tax_exemption);
    totals.local_tax = round_won(totals.income_tax * rates.local_tax_rate);
    totals.employment_insurance = round_won(totals.total_wage * rates.employment_insurance_rate);
    totals.health_insurance = round_won(totals.total_wage * rates.health_insurance_rate);
    totals.national_pension = round_won(totals.total_wage * rates.national_pension_rate);

    totals.total_deduction = totals.income_tax
        + totals.local_tax
        + totals.employment_insurance
        + totals.health_insurance
        + totals.national_pension;
    totals.net_pay = totals.total_wage - totals.total_deduction;

    debug!(
        days = totals.total_days,
        income_tax = %totals.income_tax,
        "Calculated worker totals"
    );
    totals
}
