//! Aggregated payroll result models.
//!
//! These are pure derived values: every calculation pass rebuilds them from
//! the input [`WorkRecord`](super::WorkRecord)s and the current rate snapshot.

use std::ops::AddAssign;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::WorkRecord;

/// Sums over one worker's records.
///
/// `total_days` counts records, not days with hours worked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSubtotal {
    /// Total hours worked.
    pub total_hours: Decimal,
    /// Total daily wages.
    pub total_wage: Decimal,
    /// Total allowances.
    pub total_allowances: Decimal,
    /// Total non-taxable amounts.
    pub total_tax_exemption: Decimal,
    /// `total_wage + total_allowances`.
    pub total_pay: Decimal,
    /// Total income tax.
    pub total_income_tax: Decimal,
    /// Total local income tax.
    pub total_local_tax: Decimal,
    /// Total national pension contributions.
    pub total_national_pension: Decimal,
    /// Total health insurance contributions.
    pub total_health_insurance: Decimal,
    /// Total employment insurance premiums.
    pub total_employment_insurance: Decimal,
    /// Total industrial accident contributions.
    pub total_industrial_accident: Decimal,
    /// Total long-term care contributions.
    pub total_long_term_care: Decimal,
    /// Total of every deduction.
    pub total_deduction: Decimal,
    /// Total net pay. May be negative.
    pub total_net_pay: Decimal,
    /// Number of records.
    pub total_days: usize,
}

impl AddAssign<&WorkerSubtotal> for WorkerSubtotal {
    fn add_assign(&mut self, other: &WorkerSubtotal) {
        self.total_hours += other.total_hours;
        self.total_wage += other.total_wage;
        self.total_allowances += other.total_allowances;
        self.total_tax_exemption += other.total_tax_exemption;
        self.total_pay += other.total_pay;
        self.total_income_tax += other.total_income_tax;
        self.total_local_tax += other.total_local_tax;
        self.total_national_pension += other.total_national_pension;
        self.total_health_insurance += other.total_health_insurance;
        self.total_employment_insurance += other.total_employment_insurance;
        self.total_industrial_accident += other.total_industrial_accident;
        self.total_long_term_care += other.total_long_term_care;
        self.total_deduction += other.total_deduction;
        self.total_net_pay += other.total_net_pay;
        self.total_days += other.total_days;
    }
}

/// Organisation-wide totals: every worker's subtotal summed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrandTotal {
    /// The summed subtotal fields.
    #[serde(flatten)]
    pub totals: WorkerSubtotal,
    /// Number of workers folded in.
    pub total_workers: usize,
}

/// One worker's merged work on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateGroupEntry {
    /// Identifier of the worker.
    pub worker_id: String,
    /// Display name of the worker.
    pub name: String,
    /// The worker's records for the date, merged into one.
    pub record: WorkRecord,
    /// Deductions computed on the merged record.
    pub total_deduction: Decimal,
    /// Net pay computed on the merged record.
    pub net_pay: Decimal,
}

/// All work done on one calendar date, with per-date rollups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateGroup {
    /// Display label, e.g. `"3월 4일"`.
    pub label: String,
    /// The first date seen for this label.
    pub date: NaiveDate,
    /// Per-worker entries in first-seen order.
    pub workers: Vec<DateGroupEntry>,
    /// Sum of wage plus allowances.
    pub total_amount: Decimal,
    /// Sum of deductions.
    pub total_deduction_amount: Decimal,
    /// Sum of net pay.
    pub total_net_amount: Decimal,
    /// Net pay of entries that are not yet paid.
    pub unpaid_net_amount: Decimal,
    /// True when any entry is not yet paid.
    pub has_unpaid: bool,
}

/// Tax figures for one date in the per-day worker totals path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTaxLine {
    /// The date worked.
    pub date: NaiveDate,
    /// Daily wage summed over the date's records.
    pub wage: Decimal,
    /// Taxable amount after the daily income deduction.
    pub taxable_amount: Decimal,
    /// Income tax for the date.
    pub daily_tax: Decimal,
    /// Human-readable working of the daily tax.
    pub formula: String,
}

/// One worker's totals computed day by day from wages and a rate set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerTotals {
    /// Per-date tax breakdown, ordered by date.
    pub daily: Vec<DailyTaxLine>,
    /// Number of distinct dates worked.
    pub total_days: usize,
    /// Total hours worked.
    pub total_hours: Decimal,
    /// Total daily wages.
    pub total_wage: Decimal,
    /// Sum of taxable amounts after the daily deduction.
    pub total_taxable_amount: Decimal,
    /// Income tax after the minimum-collection rule.
    pub income_tax: Decimal,
    /// Local income tax.
    pub local_tax: Decimal,
    /// Employment insurance premium on the total wage.
    pub employment_insurance: Decimal,
    /// Health insurance premium on the total wage.
    pub health_insurance: Decimal,
    /// National pension contribution on the total wage.
    pub national_pension: Decimal,
    /// Sum of the taxes and premiums above.
    pub total_deduction: Decimal,
    /// `total_wage - total_deduction`.
    pub net_pay: Decimal,
}
