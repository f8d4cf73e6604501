//! Rate configuration: storage, resolution and caching.
//!
//! Tax and insurance rates change over time, so every stored value carries an
//! effective-date range. This module loads those rows from YAML, selects the
//! row active on a given date, falls back to the statutory defaults when
//! nothing is stored, and folds the result into a [`PayrollRates`] snapshot.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::{ConfigLoader, RateProvider};
//! use chrono::NaiveDate;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), payroll_engine::error::EngineError> {
//! let table = ConfigLoader::load("./config/rates.yaml")?.into_table();
//! let provider = RateProvider::new(table);
//! let rates = provider
//!     .resolve_rates(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
//!     .await;
//! println!("Income tax rate: {}", rates.income_tax_rate);
//! # Ok(())
//! # }
//! ```

mod cache;
mod loader;
mod provider;
mod types;

pub use cache::{CachedRateProvider, Clock, RateCache, SystemClock, default_rate_cache_ttl};
pub use loader::ConfigLoader;
pub use provider::{RateProvider, RateSource, RateTable};
pub use types::{
    CATEGORY_INSURANCE, CATEGORY_TAX, CATEGORY_THRESHOLD, EligibilityThresholds, PayrollRates,
    RateKey, RateRow, RateValue, RatesFile, select_active_row,
};
