//! Time-boxed read-through rate cache for client-side callers.
//!
//! Entries expire by timestamp against an injectable [`Clock`]. Readers never
//! hold a lock across a source lookup, so two concurrent refreshes of the same
//! key may both hit the source; the later write wins. Expired entries are
//! pruned whenever a new entry is stored.
//!
//! Server-side code resolves rates live through [`RateProvider`] and does not
//! use this cache.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::events::DataChange;

use super::provider::RateProvider;
use super::types::{PayrollRates, RateKey, RateValue};

/// How long a cached rate stays fresh.
pub fn default_rate_cache_ttl() -> Duration {
    Duration::hours(1)
}

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

type SingleKey = (String, String, NaiveDate);

/// Expiring storage for single and batch rate lookups.
pub struct RateCache {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    single: RwLock<HashMap<SingleKey, Entry<Option<RateValue>>>>,
    batch: RwLock<HashMap<NaiveDate, Entry<HashMap<RateKey, RateValue>>>>,
}

impl RateCache {
    /// Creates a cache with the given clock and time-to-live.
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            single: RwLock::new(HashMap::new()),
            batch: RwLock::new(HashMap::new()),
        }
    }

    fn is_fresh<T>(&self, entry: &Entry<T>) -> bool {
        self.is_fresh_at(entry, self.clock.now())
    }

    fn is_fresh_at<T>(&self, entry: &Entry<T>, now: DateTime<Utc>) -> bool {
        now - entry.stored_at < self.ttl
    }

    /// Returns a fresh single-rate entry. The outer `Option` is the cache
    /// hit; the inner one is the cached lookup result.
    pub fn get(&self, category: &str, key: &str, as_of: NaiveDate) -> Option<Option<RateValue>> {
        let map = self.single.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&(category.to_string(), key.to_string(), as_of))
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.value.clone())
    }

    /// Stores a single-rate lookup result, dropping expired entries.
    pub fn put(&self, category: &str, key: &str, as_of: NaiveDate, value: Option<RateValue>) {
        let now = self.clock.now();
        let mut map = self.single.write().unwrap_or_else(PoisonError::into_inner);
        map.retain(|_, entry| self.is_fresh_at(entry, now));
        map.insert(
            (category.to_string(), key.to_string(), as_of),
            Entry {
                value,
                stored_at: now,
            },
        );
    }

    /// Returns a fresh batch entry for the date.
    pub fn get_all(&self, as_of: NaiveDate) -> Option<HashMap<RateKey, RateValue>> {
        let map = self.batch.read().unwrap_or_else(PoisonError::into_inner);
        map.get(&as_of)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.value.clone())
    }

    /// Stores a batch lookup result, dropping expired entries.
    pub fn put_all(&self, as_of: NaiveDate, values: HashMap<RateKey, RateValue>) {
        let now = self.clock.now();
        let mut map = self.batch.write().unwrap_or_else(PoisonError::into_inner);
        map.retain(|_, entry| self.is_fresh_at(entry, now));
        map.insert(
            as_of,
            Entry {
                value: values,
                stored_at: now,
            },
        );
    }

    /// Drops every entry for one category and key, including batch entries
    /// that contain it.
    pub fn invalidate(&self, category: &str, key: &str) {
        self.single
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(c, k, _), _| c != category || k != key);

        if RateKey::lookup(category, key).is_some() {
            self.batch
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    /// Drops every entry.
    pub fn invalidate_all(&self) {
        self.single
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.batch
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> usize {
        self.single
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
            + self
                .batch
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RateCache {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), default_rate_cache_ttl())
    }
}

/// A [`RateProvider`] behind a [`RateCache`].
///
/// Only successful lookups are cached; a failed fetch is retried on the next
/// call.
pub struct CachedRateProvider {
    provider: RateProvider,
    cache: RateCache,
}

impl CachedRateProvider {
    /// Wraps a provider with the given cache.
    pub fn new(provider: RateProvider, cache: RateCache) -> Self {
        Self { provider, cache }
    }

    /// Returns the underlying cache.
    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    /// Looks up one rate through the cache.
    pub async fn get_rate(&self, category: &str, key: &str, as_of: NaiveDate) -> Option<RateValue> {
        if let Some(hit) = self.cache.get(category, key, as_of) {
            return hit;
        }

        match self.provider.try_get_rate(category, key, as_of).await {
            Ok(value) => {
                self.cache.put(category, key, as_of, value.clone());
                value
            }
            Err(err) => {
                warn!(category, key, %as_of, error = %err, "Rate lookup failed");
                None
            }
        }
    }

    /// Resolves every known key through the cache.
    pub async fn get_all_rates(&self, as_of: NaiveDate) -> HashMap<RateKey, RateValue> {
        if let Some(hit) = self.cache.get_all(as_of) {
            return hit;
        }

        match self.provider.try_get_all_rates(as_of).await {
            Ok(values) => {
                self.cache.put_all(as_of, values.clone());
                values
            }
            Err(err) => {
                warn!(%as_of, error = %err, "Batch rate lookup failed");
                HashMap::new()
            }
        }
    }

    /// Resolves the full rate set through the cache.
    pub async fn resolve_rates(&self, as_of: NaiveDate) -> PayrollRates {
        PayrollRates::from_resolved(&self.get_all_rates(as_of).await)
    }

    /// Invalidates the cache whenever rates change, until the bus closes.
    ///
    /// A lagged receiver has missed events, so it invalidates everything.
    pub async fn follow_changes(&self, mut changes: broadcast::Receiver<DataChange>) {
        loop {
            match changes.recv().await {
                Ok(DataChange::Rates) => {
                    debug!("Rates changed, clearing rate cache");
                    self.cache.invalidate_all();
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    info!(missed, "Change feed lagged, clearing rate cache");
                    self.cache.invalidate_all();
                }
                Err(RecvError::Closed) => break,
            }
        }
    }
}
