//! Per-record deductions and net pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::PayrollRates;
use crate::models::WorkRecord;

use super::daily_tax::{calculate_income_tax_with, calculate_local_tax_with};
use super::insurance::calculate_employment_insurance_with;

/// Every deduction taken from one record's pay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDeductions {
    /// Income tax.
    pub income_tax: Decimal,
    /// Local income tax.
    pub local_tax: Decimal,
    /// National pension, as carried on the record.
    pub national_pension: Decimal,
    /// Health insurance, as carried on the record.
    pub health_insurance: Decimal,
    /// Employment insurance.
    pub employment_insurance: Decimal,
    /// Industrial accident insurance, as carried on the record.
    pub industrial_accident: Decimal,
    /// Long-term care, as carried on the record.
    pub long_term_care: Decimal,
}

impl RecordDeductions {
    /// Computes the deductions for a record.
    ///
    /// Income tax, local tax and employment insurance are derived from the
    /// record; the other contributions are taken as given.
    pub fn for_record(record: &WorkRecord, rates: &PayrollRates) -> Self {
        let income_tax = calculate_income_tax_with(record, rates);
        Self {
            income_tax,
            local_tax: calculate_local_tax_with(income_tax, rates),
            national_pension: record.national_pension,
            health_insurance: record.health_insurance,
            employment_insurance: calculate_employment_insurance_with(record, rates),
            industrial_accident: record.industrial_accident,
            long_term_care: record.long_term_care,
        }
    }

    /// Sum of every deduction.
    pub fn total(&self) -> Decimal {
        self.income_tax
            + self.local_tax
            + self.national_pension
            + self.health_insurance
            + self.employment_insurance
            + self.industrial_accident
            + self.long_term_care
    }
}

/// Calculates a record's total deduction with the default rates.
pub fn calculate_total_deduction(record: &WorkRecord) -> Decimal {
    calculate_total_deduction_with(record, &PayrollRates::default())
}

/// Calculates a record's total deduction.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::calculate_total_deduction;
/// use payroll_engine::models::WorkRecord;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let mut record = WorkRecord::new(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), dec!(200000));
/// record.national_pension = dec!(9000);
///
/// // 1,350 income + 135 local + 9,000 pension + 1,800 employment
/// assert_eq!(calculate_total_deduction(&record), dec!(12285));
/// ```
pub fn calculate_total_deduction_with(record: &WorkRecord, rates: &PayrollRates) -> Decimal {
    RecordDeductions::for_record(record, rates).total()
}

/// Calculates a record's net pay with the default rates.
pub fn calculate_net_pay(record: &WorkRecord) -> Decimal {
    calculate_net_pay_with(record, &PayrollRates::default())
}

/// Calculates a record's net pay: `daily_wage + allowances - total deduction`.
///
/// The result is not clamped and may be negative.
pub fn calculate_net_pay_with(record: &WorkRecord, rates: &PayrollRates) -> Decimal {
    record.gross_pay() - calculate_total_deduction_with(record, rates)
}
