//! Per-worker subtotals and per-date groups.
//!
//! Unsaved edits to a record's allowances or tax exemption are applied through
//! an [`OverrideResolver`] before any figure is computed, so reports can show
//! the effect of edits that have not been stored yet.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::PayrollRates;
use crate::models::{
    DateGroup, DateGroupEntry, WorkRecord, WorkerRecords, WorkerSubtotal, coerce_decimal,
};

use super::calendar::date_label;
use super::payroll::{RecordDeductions, calculate_net_pay_with};

/// A record field that an unsaved edit may replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideField {
    /// The record's allowances.
    Allowances,
    /// The record's non-taxable amount.
    TaxExemption,
}

impl OverrideField {
    /// The value stored on the record for this field.
    pub fn stored_value(self, record: &WorkRecord) -> Decimal {
        match self {
            OverrideField::Allowances => record.allowances,
            OverrideField::TaxExemption => record.tax_exemption,
        }
    }
}

/// Supplies the effective value of an overridable field.
///
/// The default implementation returns the value stored on the record.
pub trait OverrideResolver: Send + Sync {
    /// Returns the value to use for `field` of `record`.
    fn resolve_override(&self, record: &WorkRecord, field: OverrideField) -> Decimal {
        field.stored_value(record)
    }
}

/// Uses stored values only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverride;

impl OverrideResolver for NoOverride {}

/// One unsaved edit as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEdit {
    /// Id of the edited record.
    pub record_id: String,
    /// The edited field.
    pub field: OverrideField,
    /// The new value. Unreadable input counts as zero.
    #[serde(default, deserialize_with = "lenient_value")]
    pub value: Decimal,
}

fn lenient_value<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_decimal).unwrap_or(Decimal::ZERO))
}

/// Unsaved edits keyed by record id and field.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{OverrideField, OverrideResolver, PendingEdits};
/// use payroll_engine::models::WorkRecord;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let mut record = WorkRecord::new(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), dec!(150000));
/// record.id = "r-1".to_string();
///
/// let mut edits = PendingEdits::new();
/// edits.insert("r-1", OverrideField::Allowances, dec!(50000));
///
/// assert_eq!(edits.resolve_override(&record, OverrideField::Allowances), dec!(50000));
/// assert_eq!(edits.resolve_override(&record, OverrideField::TaxExemption), dec!(0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PendingEdits {
    edits: HashMap<(String, OverrideField), Decimal>,
}

impl PendingEdits {
    /// Creates an empty edit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an edit, replacing any earlier edit of the same field.
    pub fn insert(&mut self, record_id: impl Into<String>, field: OverrideField, value: Decimal) {
        self.edits.insert((record_id.into(), field), value);
    }

    /// Returns the edited value, if any.
    pub fn get(&self, record_id: &str, field: OverrideField) -> Option<Decimal> {
        self.edits.get(&(record_id.to_string(), field)).copied()
    }

    /// Number of edits held.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if there are no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

impl FromIterator<PendingEdit> for PendingEdits {
    fn from_iter<I: IntoIterator<Item = PendingEdit>>(iter: I) -> Self {
        let mut edits = PendingEdits::new();
        for edit in iter {
            edits.insert(edit.record_id, edit.field, edit.value);
        }
        edits
    }
}

impl OverrideResolver for PendingEdits {
    fn resolve_override(&self, record: &WorkRecord, field: OverrideField) -> Decimal {
        if record.id.is_empty() {
            return field.stored_value(record);
        }
        self.get(&record.id, field)
            .unwrap_or_else(|| field.stored_value(record))
    }
}

/// Returns a copy of the record with overrides applied.
pub fn apply_overrides(record: &WorkRecord, resolver: &dyn OverrideResolver) -> WorkRecord {
    let mut effective = record.clone();
    effective.allowances = resolver.resolve_override(record, OverrideField::Allowances);
    effective.tax_exemption = resolver.resolve_override(record, OverrideField::TaxExemption);
    effective
}

/// Sums one worker's records into a subtotal.
///
/// `total_days` is the number of records. Deductions are computed per record
/// and summed.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_worker_subtotal, NoOverride};
/// use payroll_engine::config::PayrollRates;
/// use payroll_engine::models::WorkRecord;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let records = vec![
///     WorkRecord::new(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(), dec!(200000)),
///     WorkRecord::new(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap(), dec!(100000)),
/// ];
/// let subtotal = calculate_worker_subtotal(&records, &NoOverride, &PayrollRates::default());
///
/// assert_eq!(subtotal.total_days, 2);
/// assert_eq!(subtotal.total_income_tax, dec!(1350));
/// assert_eq!(subtotal.total_employment_insurance, dec!(2700));
/// ```
pub fn calculate_worker_subtotal(
    records: &[WorkRecord],
    resolver: &dyn OverrideResolver,
    rates: &PayrollRates,
) -> WorkerSubtotal {
    let mut subtotal = WorkerSubtotal::default();

    for record in records {
        let record = apply_overrides(record, resolver);
        let deductions = RecordDeductions::for_record(&record, rates);
        let deduction = deductions.total();

        subtotal.total_hours += record.hours;
        subtotal.total_wage += record.daily_wage;
        subtotal.total_allowances += record.allowances;
        subtotal.total_tax_exemption += record.tax_exemption;
        subtotal.total_pay += record.gross_pay();
        subtotal.total_income_tax += deductions.income_tax;
        subtotal.total_local_tax += deductions.local_tax;
        subtotal.total_national_pension += deductions.national_pension;
        subtotal.total_health_insurance += deductions.health_insurance;
        subtotal.total_employment_insurance += deductions.employment_insurance;
        subtotal.total_industrial_accident += deductions.industrial_accident;
        subtotal.total_long_term_care += deductions.long_term_care;
        subtotal.total_deduction += deduction;
        subtotal.total_net_pay += record.gross_pay() - deduction;
    }
    subtotal.total_days = records.len();

    subtotal
}

/// Groups every worker's records by date label.
///
/// Records of the same worker with the same label are merged into one entry
/// (numeric fields summed, unpaid if any part is unpaid) and deductions are
/// computed on the merged record. Groups come back ordered by date; entries
/// keep the order workers were first seen in.
///
/// Labels carry no year, so the same month and day of different years land
/// in one group dated at the earliest of them.
pub fn group_records_by_date_with_calculations(
    workers: &[WorkerRecords],
    resolver: &dyn OverrideResolver,
    rates: &PayrollRates,
) -> Vec<DateGroup> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, DateBucket)> = Vec::new();

    for worker in workers {
        for record in &worker.records {
            let record = apply_overrides(record, resolver);
            let label = date_label(record.work_date);

            let slot = *index.entry(label.clone()).or_insert_with(|| {
                buckets.push((label.clone(), DateBucket::new(record.work_date)));
                buckets.len() - 1
            });
            buckets[slot].1.add(worker, record);
        }
    }

    let mut groups: Vec<DateGroup> = buckets
        .into_iter()
        .map(|(label, bucket)| bucket.finish(label, rates))
        .collect();
    groups.sort_by_key(|group| group.date);

    debug!(groups = groups.len(), "Grouped work records by date");
    groups
}

/// Entries for one label: worker id, worker name and merged record.
struct DateBucket {
    date: NaiveDate,
    entries: Vec<(String, String, WorkRecord)>,
}

impl DateBucket {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            entries: Vec::new(),
        }
    }

    fn add(&mut self, worker: &WorkerRecords, record: WorkRecord) {
        self.date = self.date.min(record.work_date);
        match self
            .entries
            .iter_mut()
            .find(|(worker_id, _, _)| *worker_id == worker.worker_id)
        {
            Some((_, _, merged)) => merged.merge(&record),
            None => self
                .entries
                .push((worker.worker_id.clone(), worker.name.clone(), record)),
        }
    }

    fn finish(self, label: String, rates: &PayrollRates) -> DateGroup {
        let mut group = DateGroup {
            label,
            date: self.date,
            workers: Vec::with_capacity(self.entries.len()),
            total_amount: Decimal::ZERO,
            total_deduction_amount: Decimal::ZERO,
            total_net_amount: Decimal::ZERO,
            unpaid_net_amount: Decimal::ZERO,
            has_unpaid: false,
        };

        for (worker_id, name, record) in self.entries {
            let total_deduction = RecordDeductions::for_record(&record, rates).total();
            let net_pay = calculate_net_pay_with(&record, rates);

            group.total_amount += record.gross_pay();
            group.total_deduction_amount += total_deduction;
            group.total_net_amount += net_pay;
            if !record.is_paid() {
                group.unpaid_net_amount += net_pay;
                group.has_unpaid = true;
            }

            group.workers.push(DateGroupEntry {
                worker_id,
                name,
                record,
                total_deduction,
                net_pay,
            });
        }

        group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(id: &str, on: NaiveDate, hours: Decimal, wage: Decimal) -> WorkRecord {
        let mut r = WorkRecord::new(on, wage);
        r.id = id.to_string();
        r.hours = hours;
        r
    }

    fn worker(id: &str, records: Vec<WorkRecord>) -> WorkerRecords {
        WorkerRecords {
            worker_id: id.to_string(),
            name: format!("Worker {id}"),
            records,
        }
    }

    #[test]
    fn test_subtotal_of_no_records_is_zero() {
        let subtotal = calculate_worker_subtotal(&[], &NoOverride, &PayrollRates::default());
        assert_eq!(subtotal, WorkerSubtotal::default());
    }

    #[test]
    fn test_subtotal_net_pay_identity() {
        let mut first = record("a", date(2025, 3, 4), dec!(8), dec!(200000));
        first.allowances = dec!(20000);
        first.national_pension = dec!(9000);
        let second = record("b", date(2025, 3, 5), dec!(8), dec!(100000));

        let subtotal =
            calculate_worker_subtotal(&[first, second], &NoOverride, &PayrollRates::default());

        assert_eq!(subtotal.total_pay, dec!(320000));
        assert_eq!(subtotal.total_hours, dec!(16));
        assert_eq!(
            subtotal.total_net_pay,
            subtotal.total_pay - subtotal.total_deduction
        );
        assert_eq!(
            subtotal.total_deduction,
            subtotal.total_income_tax
                + subtotal.total_local_tax
                + subtotal.total_national_pension
                + subtotal.total_health_insurance
                + subtotal.total_employment_insurance
                + subtotal.total_industrial_accident
                + subtotal.total_long_term_care
        );
    }

    #[test]
    fn test_pending_edits_change_subtotal() {
        let records = vec![record("r-1", date(2025, 3, 4), dec!(8), dec!(150000))];
        let rates = PayrollRates::default();

        let stored = calculate_worker_subtotal(&records, &NoOverride, &rates);
        assert_eq!(stored.total_income_tax, Decimal::ZERO);

        let mut edits = PendingEdits::new();
        edits.insert("r-1", OverrideField::Allowances, dec!(50000));
        let edited = calculate_worker_subtotal(&records, &edits, &rates);

        assert_eq!(edited.total_allowances, dec!(50000));
        assert_eq!(edited.total_income_tax, dec!(1350));
        assert_eq!(edited.total_local_tax, dec!(135));
    }

    #[test]
    fn test_pending_edits_ignore_records_without_id() {
        let mut edits = PendingEdits::new();
        edits.insert("", OverrideField::TaxExemption, dec!(99999));

        let mut r = record("", date(2025, 3, 4), dec!(8), dec!(150000));
        r.tax_exemption = dec!(10000);
        assert_eq!(
            edits.resolve_override(&r, OverrideField::TaxExemption),
            dec!(10000)
        );
    }

    #[test]
    fn test_pending_edit_value_is_lenient() {
        let edits: Vec<PendingEdit> = serde_json::from_str(
            r#"[
                {"record_id": "r-1", "field": "allowances", "value": "30000"},
                {"record_id": "r-2", "field": "tax_exemption", "value": "n/a"}
            ]"#,
        )
        .unwrap();
        let edits: PendingEdits = edits.into_iter().collect();

        assert_eq!(edits.len(), 2);
        assert_eq!(edits.get("r-1", OverrideField::Allowances), Some(dec!(30000)));
        assert_eq!(edits.get("r-2", OverrideField::TaxExemption), Some(Decimal::ZERO));
    }

    #[test]
    fn test_same_day_records_merge() {
        let on = date(2025, 3, 4);
        let mut paid = record("a", on, dec!(4), dec!(75000));
        paid.status = PaymentStatus::Paid;
        let unpaid = record("b", on, dec!(4), dec!(75000));

        let groups = group_records_by_date_with_calculations(
            &[worker("w1", vec![paid, unpaid])],
            &NoOverride,
            &PayrollRates::default(),
        );

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.label, "3월 4일");
        assert_eq!(group.workers.len(), 1);

        let entry = &group.workers[0];
        assert_eq!(entry.record.hours, dec!(8));
        assert_eq!(entry.record.daily_wage, dec!(150000));
        assert_eq!(entry.record.status, PaymentStatus::Unpaid);
        // Employment insurance on 150,000
        assert_eq!(entry.total_deduction, dec!(1350));
        assert_eq!(entry.net_pay, dec!(148650));
        assert!(group.has_unpaid);
        assert_eq!(group.unpaid_net_amount, dec!(148650));
    }

    #[test]
    fn test_merged_deductions_are_recomputed_not_summed() {
        let on = date(2025, 3, 4);
        let records = vec![
            record("a", on, dec!(8), dec!(100000)),
            record("b", on, dec!(8), dec!(100000)),
        ];
        let rates = PayrollRates::default();

        // Separately, neither half is taxed
        let subtotal = calculate_worker_subtotal(&records, &NoOverride, &rates);
        assert_eq!(subtotal.total_income_tax, Decimal::ZERO);

        let groups =
            group_records_by_date_with_calculations(&[worker("w1", records)], &NoOverride, &rates);
        let entry = &groups[0].workers[0];

        // Merged 200,000: 1,350 income + 135 local + 1,800 employment
        assert_eq!(entry.total_deduction, dec!(3285));
        assert_eq!(entry.net_pay, dec!(196715));
    }

    #[test]
    fn test_pending_edits_reach_merged_date_entries() {
        let on = date(2025, 3, 4);
        let records = vec![
            record("a", on, dec!(4), dec!(100000)),
            record("b", on, dec!(4), dec!(100000)),
        ];

        let mut edits = PendingEdits::new();
        edits.insert("a", OverrideField::Allowances, dec!(25000));
        edits.insert("b", OverrideField::Allowances, dec!(25000));

        let groups = group_records_by_date_with_calculations(
            &[worker("w1", records)],
            &edits,
            &PayrollRates::default(),
        );
        let entry = &groups[0].workers[0];

        assert_eq!(entry.record.allowances, dec!(50000));
        // Merged 250,000: 2,700 income + 270 local + 2,250 employment
        assert_eq!(entry.total_deduction, dec!(5220));
        assert_eq!(entry.net_pay, dec!(244780));
        assert_eq!(groups[0].total_amount, dec!(250000));
    }

    #[test]
    fn test_groups_sorted_by_date_with_rollups() {
        let w1 = worker(
            "w1",
            vec![
                record("a", date(2025, 3, 5), dec!(8), dec!(100000)),
                record("b", date(2025, 3, 4), dec!(8), dec!(100000)),
            ],
        );
        let mut paid = record("c", date(2025, 3, 5), dec!(8), dec!(200000));
        paid.status = PaymentStatus::Paid;
        let w2 = worker("w2", vec![paid]);

        let groups =
            group_records_by_date_with_calculations(&[w1, w2], &NoOverride, &PayrollRates::default());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "3월 4일");
        assert_eq!(groups[1].label, "3월 5일");

        let fifth = &groups[1];
        assert_eq!(fifth.workers.len(), 2);
        assert_eq!(fifth.workers[0].worker_id, "w1");
        assert_eq!(fifth.total_amount, dec!(300000));
        assert_eq!(
            fifth.total_net_amount,
            fifth.total_amount - fifth.total_deduction_amount
        );
        // Only w1's entry is unpaid
        assert_eq!(fifth.unpaid_net_amount, dec!(99100));
    }

    #[test]
    fn test_same_label_across_years_shares_a_group() {
        let w = worker(
            "w1",
            vec![
                record("a", date(2025, 3, 4), dec!(8), dec!(100000)),
                record("b", date(2024, 3, 4), dec!(8), dec!(100000)),
            ],
        );
        let groups =
            group_records_by_date_with_calculations(&[w], &NoOverride, &PayrollRates::default());

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].date, date(2024, 3, 4));
        assert_eq!(groups[0].workers[0].record.daily_wage, dec!(200000));
    }
}
