//! Payroll Engine for Korean Construction Daily-Wage Workers
//!
//! This crate calculates withholding income tax, local income tax and the
//! four major social insurance contributions for daily-wage workers, and
//! aggregates work records into per-worker, per-date and organisation-wide
//! totals. Rates are time-versioned and resolved for the date being paid.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod models;
