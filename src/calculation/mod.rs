//! Payroll calculations for daily-wage workers.
//!
//! This module contains the per-record tax and insurance calculators, the
//! aggregation of records into per-worker subtotals, per-date groups and a
//! grand total, the day-by-day worker totals used on monthly statements, and
//! the calendar and work-type helpers that classify each working day.
//!
//! Every function here is synchronous and pure. Rates come in as a resolved
//! [`PayrollRates`](crate::config::PayrollRates) snapshot; the plain variants
//! without `_with` use the statutory defaults.

mod aggregation;
mod calendar;
mod daily_tax;
mod grand_total;
mod insurance;
mod payroll;
mod work_type;
mod worker_totals;

pub use aggregation::{
    NoOverride, OverrideField, OverrideResolver, PendingEdit, PendingEdits, apply_overrides,
    calculate_worker_subtotal, group_records_by_date_with_calculations,
};
pub use calendar::{
    CalendarDay, DEFAULT_HOLIDAYS, YearMonth, date_label, get_days_in_month, is_holiday,
    is_holiday_by_date, is_sunday_by_date, month_days, parse_date,
};
pub use daily_tax::{
    DEFAULT_MIN_TAX_EXEMPTION, DailyTaxResult, apply_minimum_tax_rule, calculate_daily_tax,
    calculate_income_tax, calculate_income_tax_with, calculate_local_tax,
    calculate_local_tax_with, round_won,
};
pub use grand_total::calculate_grand_total;
pub use insurance::{
    AccidentRateClass, EligibilityInput, InsuranceEligibility, InsurancePremiums,
    age_from_resident_number, assess_insurance_eligibility, calculate_employment_insurance,
    calculate_employment_insurance_with, calculate_insurance_premiums,
};
pub use payroll::{
    RecordDeductions, calculate_net_pay, calculate_net_pay_with, calculate_total_deduction,
    calculate_total_deduction_with,
};
pub use work_type::{
    annotate_record, create_work_type_metadata, determine_work_type, determine_work_type_with,
    parse_work_type_metadata,
};
pub use worker_totals::calculate_worker_totals;
