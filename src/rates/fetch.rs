//! Downloading raw NBP archive tables

use crate::currency::TableGroup;
use crate::error::{ConversionError, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Archive URL pattern with `{table}` and `{year}` placeholders
pub const DEFAULT_TABLE_URL: &str =
    "https://static.nbp.pl/dane/kursy/Archiwum/archiwum_tab_{table}_{year}.csv";

/// Source of raw rate table files
pub trait TableFetcher: Send + Sync {
    /// Retrieve `url` into `destination`, returning the number of bytes written
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64>;
}

/// Fill the archive URL pattern for one table and year
pub fn table_url(pattern: &str, table: TableGroup, year: i32) -> String {
    pattern
        .replace("{table}", table.id())
        .replace("{year}", &year.to_string())
}

/// Scratch file name for one table and year
pub fn table_file_name(table: TableGroup, year: i32) -> String {
    format!("archiwum_tab_{}_{}.csv", table.id(), year)
}

/// Path inside `scratch_dir` where a downloaded table is stored
pub fn table_path(scratch_dir: &Path, table: TableGroup, year: i32) -> PathBuf {
    scratch_dir.join(table_file_name(table, year))
}

/// Blocking HTTP fetcher for the NBP archive
pub struct HttpTableFetcher {
    client: Client,
}

impl HttpTableFetcher {
    /// Create a fetcher with the given request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("transactions2pln/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConversionError::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl TableFetcher for HttpTableFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<u64> {
        log::info!("Downloading {} -> {}", url, destination.display());

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ConversionError::Fetch(format!("HTTP request failed: {}", e)))?
            .error_for_status()
            .map_err(|e| ConversionError::Fetch(format!("NBP archive returned error: {}", e)))?;

        let bytes = response
            .bytes()
            .map_err(|e| ConversionError::Fetch(format!("Failed to read response: {}", e)))?;

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(destination, &bytes)?;

        log::debug!("Saved {} bytes to {}", bytes.len(), destination.display());
        Ok(bytes.len() as u64)
    }
}
