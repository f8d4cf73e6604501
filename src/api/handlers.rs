//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    PendingEdits, annotate_record, calculate_grand_total, calculate_worker_subtotal,
    calculate_worker_totals, group_records_by_date_with_calculations, month_days, parse_date,
};
use crate::config::{PayrollRates, RateKey};

use super::request::{CalendarQuery, RatesQuery, SummaryRequest, WorkerTotalsRequest};
use super::response::{
    ApiError, ApiErrorResponse, CalendarResponse, RateEntry, RatesResponse, SummaryResponse,
    WorkerSummary, WorkerTotalsResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/payroll/summary", post(summary_handler))
        .route("/payroll/worker-totals", post(worker_totals_handler))
        .route("/rates", get(rates_handler))
        .route("/calendar", get(calendar_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Maps a JSON body rejection to a 400 response.
fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    error_response(ApiErrorResponse::bad_request(error))
}

/// Maps a query-string rejection to a 400 response.
fn query_rejection_response(rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(error = %body_text, "Query string error");
    error_response(ApiErrorResponse::bad_request(ApiError::validation_error(
        body_text,
    )))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Handler for POST /payroll/summary.
///
/// Returns per-worker subtotals, per-date groups and the grand total for the
/// submitted records, with pending edits applied.
async fn summary_handler(
    State(state): State<AppState>,
    payload: Result<Json<SummaryRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll summary request");

    let mut request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let as_of = request
        .as_of
        .or_else(|| request.earliest_work_date())
        .unwrap_or_else(today);
    let rates = state.rates().resolve_rates(as_of).await;

    for worker in &mut request.workers {
        for record in &mut worker.records {
            annotate_record(record, state.holidays());
        }
    }

    let start_time = Instant::now();
    let edits: PendingEdits = request.pending_edits.into_iter().collect();
    let workers = request.workers;

    let summaries: Vec<WorkerSummary> = workers
        .iter()
        .map(|worker| WorkerSummary {
            worker_id: worker.worker_id.clone(),
            name: worker.name.clone(),
            subtotal: calculate_worker_subtotal(&worker.records, &edits, &rates),
        })
        .collect();
    let date_groups = group_records_by_date_with_calculations(&workers, &edits, &rates);
    let grand_total = calculate_grand_total(&workers, &edits, &rates);

    info!(
        correlation_id = %correlation_id,
        %as_of,
        workers = grand_total.total_workers,
        records = grand_total.totals.total_days,
        pending_edits = edits.len(),
        total_net_pay = %grand_total.totals.total_net_pay,
        duration_us = start_time.elapsed().as_micros(),
        "Payroll summary completed"
    );

    json_response(
        StatusCode::OK,
        SummaryResponse {
            calculation_id: correlation_id,
            timestamp: Utc::now(),
            as_of,
            rates,
            workers: summaries,
            date_groups,
            grand_total,
        },
    )
}

/// Handler for POST /payroll/worker-totals.
///
/// Returns one worker's day-by-day tax breakdown and totals.
async fn worker_totals_handler(
    State(state): State<AppState>,
    payload: Result<Json<WorkerTotalsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing worker totals request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let as_of = request
        .as_of
        .or_else(|| request.earliest_work_date())
        .unwrap_or_else(today);
    let rates = state.rates().resolve_rates(as_of).await;

    let start_time = Instant::now();
    let totals = calculate_worker_totals(&request.records, &rates);

    info!(
        correlation_id = %correlation_id,
        worker_id = request.worker_id.as_deref().unwrap_or("-"),
        days = totals.total_days,
        income_tax = %totals.income_tax,
        duration_us = start_time.elapsed().as_micros(),
        "Worker totals completed"
    );

    json_response(
        StatusCode::OK,
        WorkerTotalsResponse {
            calculation_id: correlation_id,
            timestamp: Utc::now(),
            as_of,
            worker_id: request.worker_id,
            rates,
            totals,
        },
    )
}

/// Handler for GET /rates.
///
/// Resolves every known rate for the given date. Unlike the calculation
/// endpoints, a failing rate source is reported rather than masked with
/// defaults.
async fn rates_handler(
    State(state): State<AppState>,
    query: Result<Query<RatesQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_response(rejection),
    };
    let as_of = match query.date.as_deref().map(parse_date).transpose() {
        Ok(date) => date.unwrap_or_else(today),
        Err(err) => {
            warn!(error = %err, "Rejected rate query");
            return error_response(err.into());
        }
    };

    let resolved = match state.rates().try_get_all_rates(as_of).await {
        Ok(resolved) => resolved,
        Err(err) => {
            warn!(%as_of, error = %err, "Rate source unavailable");
            return error_response(err.into());
        }
    };

    let mut keys: Vec<RateKey> = resolved.keys().copied().collect();
    keys.sort();
    let entries = keys
        .into_iter()
        .filter_map(|key| {
            resolved.get(&key).map(|value| RateEntry {
                category: key.category().to_string(),
                key: key.key().to_string(),
                value: value.clone(),
            })
        })
        .collect();

    json_response(
        StatusCode::OK,
        RatesResponse {
            as_of,
            entries,
            rates: PayrollRates::from_resolved(&resolved),
        },
    )
}

/// Handler for GET /calendar.
///
/// Lists every day of a month with its Sunday and holiday flags.
async fn calendar_handler(
    State(state): State<AppState>,
    query: Result<Query<CalendarQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_response(rejection),
    };
    match month_days(&query.month, state.holidays()) {
        Ok(days) => json_response(
            StatusCode::OK,
            CalendarResponse {
                month: query.month,
                days_in_month: days.len() as u32,
                days,
            },
        ),
        Err(err) => {
            warn!(month = %query.month, error = %err, "Rejected calendar query");
            error_response(ApiErrorResponse::from(err))
        }
    }
}
