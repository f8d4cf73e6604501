//! Response types for the payroll API.
//!
//! This module defines the response bodies, the error response structure and
//! the mapping from [`EngineError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::CalendarDay;
use crate::config::{PayrollRates, RateValue};
use crate::error::EngineError;
use crate::models::{DateGroup, GrandTotal, WorkerSubtotal, WorkerTotals};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::RateLookup {
                category,
                key,
                message,
            } => ApiErrorResponse {
                status: StatusCode::SERVICE_UNAVAILABLE,
                error: ApiError::with_details(
                    "RATE_SOURCE_UNAVAILABLE",
                    format!("Rate lookup failed for '{}.{}'", category, key),
                    message,
                ),
            },
            EngineError::InvalidYearMonth { value } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "INVALID_YEAR_MONTH",
                    format!("Invalid year-month: {}", value),
                    "Expected the form YYYY-MM",
                ),
            ),
            EngineError::InvalidDate { value } => ApiErrorResponse::bad_request(
                ApiError::with_details(
                    "INVALID_DATE",
                    format!("Invalid date: {}", value),
                    "Expected the form YYYY-MM-DD",
                ),
            ),
        }
    }
}

/// One worker's subtotal in a summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Identifier of the worker.
    pub worker_id: String,
    /// Display name of the worker.
    pub name: String,
    /// The worker's subtotal.
    pub subtotal: WorkerSubtotal,
}

/// Response body for `POST /payroll/summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Unique id of this calculation.
    pub calculation_id: Uuid,
    /// When the calculation ran.
    pub timestamp: DateTime<Utc>,
    /// Date the rates were resolved for.
    pub as_of: NaiveDate,
    /// The rate snapshot used.
    pub rates: PayrollRates,
    /// Per-worker subtotals in request order.
    pub workers: Vec<WorkerSummary>,
    /// Per-date groups ordered by date.
    pub date_groups: Vec<DateGroup>,
    /// Organisation total.
    pub grand_total: GrandTotal,
}

/// Response body for `POST /payroll/worker-totals`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerTotalsResponse {
    /// Unique id of this calculation.
    pub calculation_id: Uuid,
    /// When the calculation ran.
    pub timestamp: DateTime<Utc>,
    /// Date the rates were resolved for.
    pub as_of: NaiveDate,
    /// Identifier of the worker, when given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    /// The rate snapshot used.
    pub rates: PayrollRates,
    /// The computed totals.
    pub totals: WorkerTotals,
}

/// One resolved rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateEntry {
    /// Rate category.
    pub category: String,
    /// Rate key.
    pub key: String,
    /// Resolved value.
    pub value: RateValue,
}

/// Response body for `GET /rates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesResponse {
    /// Date the rates were resolved for.
    pub as_of: NaiveDate,
    /// Every known key with its resolved value.
    pub entries: Vec<RateEntry>,
    /// The same values as a rate snapshot.
    pub rates: PayrollRates,
}

/// Response body for `GET /calendar`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarResponse {
    /// The month, `YYYY-MM`.
    pub month: String,
    /// Number of days in the month.
    pub days_in_month: u32,
    /// Every day of the month.
    pub days: Vec<CalendarDay>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details")); // Should be skipped when None
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_invalid_date_maps_to_bad_request() {
        let api_error: ApiErrorResponse = EngineError::InvalidDate {
            value: "2025-02-30".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.error.code, "INVALID_DATE");
        assert!(api_error.error.message.contains("2025-02-30"));
    }

    #[test]
    fn test_rate_lookup_maps_to_service_unavailable() {
        let api_error: ApiErrorResponse = EngineError::RateLookup {
            category: "tax".to_string(),
            key: "*".to_string(),
            message: "connection refused".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(api_error.error.details.as_deref(), Some("connection refused"));
    }
}
