//! Organisation-wide totals.

use tracing::debug;

use crate::config::PayrollRates;
use crate::models::{GrandTotal, WorkerRecords};

use super::aggregation::{OverrideResolver, calculate_worker_subtotal};

/// Sums every worker's subtotal into a grand total.
///
/// The result does not depend on worker order.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_grand_total, NoOverride};
/// use payroll_engine::config::PayrollRates;
/// use payroll_engine::models::{WorkRecord, WorkerRecords};
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
/// let workers = vec![
///     WorkerRecords { worker_id: "w1".into(), name: "Kim".into(), records: vec![WorkRecord::new(day, dec!(200000))] },
///     WorkerRecords { worker_id: "w2".into(), name: "Lee".into(), records: vec![WorkRecord::new(day, dec!(100000))] },
/// ];
///
/// let total = calculate_grand_total(&workers, &NoOverride, &PayrollRates::default());
/// assert_eq!(total.total_workers, 2);
/// assert_eq!(total.totals.total_wage, dec!(300000));
/// ```
pub fn calculate_grand_total(
    workers: &[WorkerRecords],
    resolver: &dyn OverrideResolver,
    rates: &PayrollRates,
) -> GrandTotal {
    let mut grand = GrandTotal {
        total_workers: workers.len(),
        ..Default::default()
    };

    for worker in workers {
        let subtotal = calculate_worker_subtotal(&worker.records, resolver, rates);
        grand.totals += &subtotal;
    }

    debug!(
        workers = grand.total_workers,
        days = grand.totals.total_days,
        "Calculated grand total"
    );
    grand
}
