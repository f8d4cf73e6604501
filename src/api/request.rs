//! Request types for the payroll API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::PendingEdit;
use crate::models::{WorkRecord, WorkerRecords};

/// Request body for `POST /payroll/summary`.
///
/// Carries every worker's records for the reporting period plus any edits
/// the client has not stored yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    /// Date whose rates apply. Defaults to the earliest record date.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Workers and their records.
    pub workers: Vec<WorkerRecords>,
    /// Unsaved edits to apply before calculating.
    #[serde(default)]
    pub pending_edits: Vec<PendingEdit>,
}

impl SummaryRequest {
    /// The earliest work date across all workers, if any.
    pub fn earliest_work_date(&self) -> Option<NaiveDate> {
        self.workers
            .iter()
            .flat_map(|w| w.records.iter().map(|r| r.work_date))
            .min()
    }
}

/// Request body for `POST /payroll/worker-totals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerTotalsRequest {
    /// Date whose rates apply. Defaults to the earliest record date.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
    /// Identifier of the worker, echoed back.
    #[serde(default)]
    pub worker_id: Option<String>,
    /// The worker's records.
    pub records: Vec<WorkRecord>,
}

impl WorkerTotalsRequest {
    /// The earliest work date, if any.
    pub fn earliest_work_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.work_date).min()
    }
}

/// Query string for `GET /rates`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RatesQuery {
    /// `YYYY-MM-DD`; today when absent.
    pub date: Option<String>,
}

/// Query string for `GET /calendar`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarQuery {
    /// `YYYY-MM`.
    pub month: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_request_minimal_body() {
        let request: SummaryRequest = serde_json::from_str(
            r#"{"workers": [{"worker_id": "w1", "records": [
                {"work_date": "2025-03-05", "daily_wage": 200000},
                {"work_date": "2025-03-04", "daily_wage": "150000"}
            ]}]}"#,
        )
        .unwrap();

        assert!(request.as_of.is_none());
        assert!(request.pending_edits.is_empty());
        assert_eq!(request.workers[0].name, "");
        assert_eq!(
            request.earliest_work_date(),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
    }

    #[test]
    fn test_worker_totals_request_without_records_has_no_date() {
        let request: WorkerTotalsRequest = serde_json::from_str(r#"{"records": []}"#).unwrap();
        assert!(request.earliest_work_date().is_none());
    }
}
