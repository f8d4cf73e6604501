//! HTTP API for the payroll engine.
//!
//! This module provides the REST endpoints for payroll summaries, per-worker
//! totals, rate lookups and the working calendar.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{CalendarQuery, RatesQuery, SummaryRequest, WorkerTotalsRequest};
pub use response::{
    ApiError, ApiErrorResponse, CalendarResponse, RateEntry, RatesResponse, SummaryResponse,
    WorkerSummary, WorkerTotalsResponse,
};
pub use state::AppState;
