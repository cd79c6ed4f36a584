//! NBP exchange rate resolution
//!
//! Resolves the PLN rate of a currency on a given day from the NBP daily
//! archive tables.
//!
//! # Components
//!
//! - **fetch**: `TableFetcher` trait and the blocking HTTP implementation
//! - **table**: parsing of raw archive files into `RateTable`
//! - **manager**: `ExchangeRateManager`, per-year lazy table cache
//!
//! # Example
//!
//! ```rust
//! use transactions2pln::rates::{ExchangeRateSource, InMemoryRateSource};
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use std::str::FromStr;
//!
//! let date = NaiveDate::from_ymd_opt(2023, 5, 2).unwrap();
//! let mut rates = InMemoryRateSource::new();
//! rates.add_rate("USD", date, Decimal::from_str("4.1823").unwrap());
//!
//! let rate = rates.exchange_rate("USD", date).unwrap();
//! assert_eq!(rate.to_string(), "4.1823");
//! ```

pub mod fetch;
pub mod manager;
pub mod table;

pub use fetch::{HttpTableFetcher, TableFetcher, DEFAULT_TABLE_URL};
pub use manager::ExchangeRateManager;
pub use table::RateTable;

use crate::calendar::{fallback_window, RATE_FALLBACK_DAYS};
use crate::currency::TableGroup;
use crate::error::{ConversionError, Result};
use chrono::NaiveDate;
use hashbrown::HashMap;
use rust_decimal::Decimal;

/// Trait for reading PLN exchange rates
pub trait ExchangeRateSource {
    /// Rate such that: pln_amount = amount * rate
    fn exchange_rate(&mut self, currency: &str, date: NaiveDate) -> Result<Decimal>;

    /// Number of remote tables loaded so far
    fn tables_fetched(&self) -> usize {
        0
    }
}

/// In-memory rate storage
///
/// Applies the same fallback window as the NBP tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateSource {
    rates: HashMap<(String, NaiveDate), Decimal>,
}

impl InMemoryRateSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single rate
    pub fn add_rate(&mut self, currency: &str, date: NaiveDate, rate: Decimal) {
        self.rates.insert((currency.to_string(), date), rate);
    }
}

impl ExchangeRateSource for InMemoryRateSource {
    fn exchange_rate(&mut self, currency: &str, date: NaiveDate) -> Result<Decimal> {
        let group = TableGroup::for_currency(currency)?;
        fallback_window(date, RATE_FALLBACK_DAYS)
            .find_map(|candidate| self.rates.get(&(currency.to_string(), candidate)))
            .copied()
            .ok_or_else(|| ConversionError::RateUnavailable {
                date,
                table: group.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_fallback() {
        let friday = NaiveDate::from_ymd_opt(2023, 4, 28).unwrap();
        let mut rates = InMemoryRateSource::new();
        rates.add_rate("EUR", friday, Decimal::new(45889, 4));

        let sunday = NaiveDate::from_ymd_opt(2023, 4, 30).unwrap();
        assert_eq!(rates.exchange_rate("EUR", sunday).unwrap(), Decimal::new(45889, 4));
        assert!(rates
            .exchange_rate("EUR", NaiveDate::from_ymd_opt(2023, 5, 3).unwrap())
            .is_err());
        assert!(matches!(
            rates.exchange_rate("XYZ", friday),
            Err(ConversionError::UnknownCurrency(_))
        ));
    }
}
