//! Rate file loading.
//!
//! This module provides the [`ConfigLoader`] type for loading the stored rate
//! table from a YAML file.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::provider::RateTable;
use super::types::{RateRow, RatesFile};

/// Loads the time-versioned rate table from YAML.
///
/// # File Structure
///
/// ```text
/// rates:
///   - category: tax
///     key: income_tax_rate
///     value: 0.06
///     effective_from: 2024-01-01
///   - category: threshold
///     key: pension_wage_threshold
///     value: 2200000
///     effective_from: 2025-01-01
///     effective_to: 2025-12-31
/// holidays:            # optional, replaces the built-in calendar
///   - 2026-01-01
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/rates.yaml")?;
/// println!("Loaded {} rate rows", loader.rows().len());
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rows: Vec<RateRow>,
    holidays: Option<Vec<NaiveDate>>,
}

impl ConfigLoader {
    /// Loads the rate table from the specified file.
    ///
    /// Returns `ConfigNotFound` when the file cannot be read and
    /// `ConfigParseError` when it is not a valid rate file.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let file = Self::load_yaml::<RatesFile>(path)?;

        info!(
            path = %path.display(),
            rows = file.rates.len(),
            holidays = file.holidays.as_ref().map_or(0, Vec::len),
            "Loaded rate table"
        );

        Ok(Self::from_file(file))
    }

    /// Parses a rate table from YAML text.
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        let file: RatesFile =
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: RatesFile) -> Self {
        Self {
            rows: file.rates,
            holidays: file.holidays,
        }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded rows.
    pub fn rows(&self) -> &[RateRow] {
        &self.rows
    }

    /// Returns the configured holiday list, if the file carries one.
    pub fn holidays(&self) -> Option<&[NaiveDate]> {
        self.holidays.as_deref()
    }

    /// Converts the loaded rows into an in-memory rate source.
    pub fn into_table(self) -> RateTable {
        RateTable::new(self.rows)
    }
}
