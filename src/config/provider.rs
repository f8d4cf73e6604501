//! Rate resolution against a time-versioned rate source.
//!
//! [`RateSource`] is the persistence seam: any store that can answer a
//! range query over rate rows. [`RateProvider`] applies the selection rule on
//! top of it and never lets a lookup failure escape; failed lookups are logged
//! and surface as "no value", and callers fall back to the static defaults.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::EngineResult;

use super::types::{PayrollRates, RateKey, RateRow, RateValue, select_active_row};

/// A store of time-versioned rate rows.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Returns the rows for a category and key with `effective_from <= as_of`,
    /// newest first.
    async fn rows_for(
        &self,
        category: &str,
        key: &str,
        as_of: NaiveDate,
    ) -> EngineResult<Vec<RateRow>>;

    /// Returns every row with `effective_from <= as_of`, newest first.
    async fn active_rows(&self, as_of: NaiveDate) -> EngineResult<Vec<RateRow>>;
}

/// An in-memory rate source.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rows: Vec<RateRow>,
}

impl RateTable {
    /// Creates a table from rows in any order.
    pub fn new(mut rows: Vec<RateRow>) -> Self {
        rows.sort_by(|a, b| b.effective_from.cmp(&a.effective_from));
        Self { rows }
    }

    /// Returns the stored rows, newest first.
    pub fn rows(&self) -> &[RateRow] {
        &self.rows
    }
}

#[async_trait]
impl RateSource for RateTable {
    async fn rows_for(
        &self,
        category: &str,
        key: &str,
        as_of: NaiveDate,
    ) -> EngineResult<Vec<RateRow>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.matches(category, key) && row.effective_from <= as_of)
            .cloned()
            .collect())
    }

    async fn active_rows(&self, as_of: NaiveDate) -> EngineResult<Vec<RateRow>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.effective_from <= as_of)
            .cloned()
            .collect())
    }
}

/// Resolves rates as of a date, falling back to static defaults.
///
/// # Example
///
/// ```
/// use payroll_engine::config::{RateProvider, RateTable, RateValue};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = RateProvider::new(RateTable::default());
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
///
/// // No stored rows: the documented default comes back.
/// let rate = provider.get_rate("tax", "income_tax_rate", date).await;
/// assert_eq!(rate, Some(RateValue::Number(Decimal::new(6, 2))));
/// # }
/// ```
#[derive(Clone)]
pub struct RateProvider {
    source: Arc<dyn RateSource>,
}

impl RateProvider {
    /// Creates a provider over the given source.
    pub fn new<S: RateSource + 'static>(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    /// Creates a provider over a shared source.
    pub fn from_shared(source: Arc<dyn RateSource>) -> Self {
        Self { source }
    }

    /// Looks up one rate, propagating source failures.
    ///
    /// Returns the active stored value, else the static default for a known
    /// key, else `None`.
    pub async fn try_get_rate(
        &self,
        category: &str,
        key: &str,
        as_of: NaiveDate,
    ) -> EngineResult<Option<RateValue>> {
        let rows = self.source.rows_for(category, key, as_of).await?;

        if let Some(row) = select_active_row(&rows, category, key, as_of) {
            return Ok(Some(row.value.clone()));
        }

        let fallback = RateKey::lookup(category, key).map(|k| RateValue::Number(k.default_value()));
        debug!(
            category,
            key,
            %as_of,
            has_default = fallback.is_some(),
            "No active rate row, using static default"
        );
        Ok(fallback)
    }

    /// Looks up one rate. Source failures are logged and yield `None`.
    pub async fn get_rate(&self, category: &str, key: &str, as_of: NaiveDate) -> Option<RateValue> {
        match self.try_get_rate(category, key, as_of).await {
            Ok(value) => value,
            Err(err) => {
                warn!(category, key, %as_of, error = %err, "Rate lookup failed");
                None
            }
        }
    }

    /// Resolves every known key in one source query, propagating failures.
    pub async fn try_get_all_rates(
        &self,
        as_of: NaiveDate,
    ) -> EngineResult<HashMap<RateKey, RateValue>> {
        let rows = self.source.active_rows(as_of).await?;

        Ok(RateKey::ALL
            .into_iter()
            .map(|key| {
                let value = select_active_row(&rows, key.category(), key.key(), as_of)
                    .map(|row| row.value.clone())
                    .unwrap_or_else(|| RateValue::Number(key.default_value()));
                (key, value)
            })
            .collect())
    }

    /// Resolves every known key. Source failures are logged and yield an
    /// empty map.
    pub async fn get_all_rates(&self, as_of: NaiveDate) -> HashMap<RateKey, RateValue> {
        match self.try_get_all_rates(as_of).await {
            Ok(values) => values,
            Err(err) => {
                warn!(%as_of, error = %err, "Batch rate lookup failed");
                HashMap::new()
            }
        }
    }

    /// Resolves the full rate set for a calculation pass.
    pub async fn resolve_rates(&self, as_of: NaiveDate) -> PayrollRates {
        PayrollRates::from_resolved(&self.get_all_rates(as_of).await)
    }
}
