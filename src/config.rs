//! Configuration file support
//!
//! Settings are read from `--config <path>` or from
//! `~/.transactions2pln/config.toml`. Every field is optional; command-line
//! options take precedence over the file.
//!
//! ```toml
//! currency = "EUR"
//! date_format = "%Y-%m-%d"
//! http_timeout_secs = 10
//!
//! [number_format]
//! decimal_separator = ","
//! ```

use crate::error::{ConversionError, Result};
use crate::number::NumberFormat;
use crate::pipeline::DEFAULT_DATE_FORMAT;
use crate::rates::DEFAULT_TABLE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by every run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Currency used when no `--currency` is given
    pub currency: String,
    /// Date format used when no `--date-format` is given
    pub date_format: String,
    /// NBP archive URL pattern with `{table}` and `{year}` placeholders
    pub table_url: String,
    pub http_timeout_secs: u64,
    /// Output number format; NBP tables are always read with a decimal comma
    pub number_format: NumberFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            table_url: DEFAULT_TABLE_URL.to_string(),
            http_timeout_secs: 30,
            number_format: NumberFormat::default(),
        }
    }
}

impl Settings {
    /// Parse settings from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(contents).map_err(|e| ConversionError::Config(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ConversionError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&contents)
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
            Some(p) if p.exists() => p,
            _ => return Settings::default(),
        };

        match Self::from_file(&path) {
            Ok(settings) => {
                log::debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Failed to load config: {}", e);
                Settings::default()
            }
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if !self.table_url.contains("{table}") || !self.table_url.contains("{year}") {
            return Err(ConversionError::Config(format!(
                "table_url must contain {{table}} and {{year}}: {}",
                self.table_url
            )));
        }
        if self.number_format.decimal_separator.is_ascii_digit() {
            return Err(ConversionError::Config(
                "decimal_separator cannot be a digit".to_string(),
            ));
        }
        Ok(())
    }
}

/// `~/.transactions2pln/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".transactions2pln").join("config.toml"))
}
