//! Lazily downloaded NBP tables for one year

use super::fetch::{table_path, table_url, TableFetcher, DEFAULT_TABLE_URL};
use super::table::RateTable;
use super::ExchangeRateSource;
use crate::calendar::RATE_FALLBACK_DAYS;
use crate::currency::TableGroup;
use crate::error::{ConversionError, Result};
use crate::number::NumberFormat;
use chrono::NaiveDate;
use hashbrown::HashMap;
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Rate tables for a single year, fetched on first use and cached per group.
///
/// A table group is downloaded at most once per manager; later lookups are
/// served from the cache. The scratch directory is owned by the caller and
/// must outlive the manager.
pub struct ExchangeRateManager {
    year: i32,
    scratch_dir: PathBuf,
    fetcher: Arc<dyn TableFetcher>,
    url_pattern: String,
    tables: HashMap<TableGroup, RateTable>,
}

impl ExchangeRateManager {
    /// Create a manager using the default archive URL
    pub fn new(fetcher: Arc<dyn TableFetcher>, scratch_dir: &Path, year: i32) -> Self {
        log::info!("Using NBP tables for {}", year);
        Self {
            year,
            scratch_dir: scratch_dir.to_path_buf(),
            fetcher,
            url_pattern: DEFAULT_TABLE_URL.to_string(),
            tables: HashMap::new(),
        }
    }

    /// Override the archive URL pattern
    pub fn with_url_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.url_pattern = pattern.into();
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Number of tables downloaded so far
    pub fn tables_fetched(&self) -> usize {
        self.tables.len()
    }

    /// Table for a group identifier such as `"a"`, downloading it on first use
    pub fn get_table(&mut self, table: &str) -> Result<&RateTable> {
        let group = TableGroup::from_id(table)?;
        self.table(group)
    }

    /// Table for a group, downloading it on first use
    pub fn table(&mut self, group: TableGroup) -> Result<&RateTable> {
        if !self.tables.contains_key(&group) {
            let table = self.download_table(group)?;
            self.tables.insert(group, table);
        }
        self.tables
            .get(&group)
            .ok_or_else(|| ConversionError::UnknownTableGroup(group.id().to_string()))
    }

    fn download_table(&self, group: TableGroup) -> Result<RateTable> {
        let url = table_url(&self.url_pattern, group, self.year);
        let dest = table_path(&self.scratch_dir, group, self.year);
        self.fetcher.fetch(&url, &dest)?;

        let bytes = fs::read(&dest)?;
        let table = RateTable::from_cp1250(group, &bytes)?;
        log::info!("Loaded table {} for {}: {} dates", group, self.year, table.len());
        Ok(table)
    }

    /// Rate in PLN of one unit of `currency` on `date`.
    ///
    /// Falls back to the nearest earlier published rate, up to
    /// [`RATE_FALLBACK_DAYS`] days before `date`.
    pub fn get_exchange_ratio(&mut self, currency: &str, date: NaiveDate) -> Result<Decimal> {
        let group = TableGroup::for_currency(currency)?;
        let table = self.table(group)?;
        let raw = table.raw_rate(currency, date, RATE_FALLBACK_DAYS)?;
        NumberFormat::NBP.parse(raw)
    }
}

impl ExchangeRateSource for ExchangeRateManager {
    fn exchange_rate(&mut self, currency: &str, date: NaiveDate) -> Result<Decimal> {
        self.get_exchange_ratio(currency, date)
    }

    fn tables_fetched(&self) -> usize {
        self.tables.len()
    }
}
