//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::{ConfigLoader, RateProvider};

/// Shared application state.
///
/// Holds the live rate provider and the holiday calendar used to classify
/// working days. Handlers resolve rates per request; nothing is cached here.
#[derive(Clone)]
pub struct AppState {
    rates: RateProvider,
    holidays: Option<Arc<[NaiveDate]>>,
}

impl AppState {
    /// Creates a state over the given provider using the built-in holiday
    /// calendar.
    pub fn new(rates: RateProvider) -> Self {
        Self {
            rates,
            holidays: None,
        }
    }

    /// Builds the state from a loaded rate file, taking its holiday list
    /// when it has one.
    pub fn from_config(config: ConfigLoader) -> Self {
        let holidays = config.holidays().map(Arc::from);
        Self {
            rates: RateProvider::new(config.into_table()),
            holidays,
        }
    }

    /// Replaces the holiday calendar.
    pub fn with_holidays(mut self, holidays: Vec<NaiveDate>) -> Self {
        self.holidays = Some(Arc::from(holidays));
        self
    }

    /// Returns the rate provider.
    pub fn rates(&self) -> &RateProvider {
        &self.rates
    }

    /// Returns the configured holidays, or `None` for the built-in calendar.
    pub fn holidays(&self) -> Option<&[NaiveDate]> {
        self.holidays.as_deref()
    }
}
