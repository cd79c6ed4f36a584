//! # transactions2pln
//!
//! Adds Polish zloty (PLN) equivalents to CSV files of foreign-currency
//! transactions, using the daily exchange-rate tables published by the
//! National Bank of Poland (NBP).
//!
//! Each transaction row gets two trailing cells: the NBP rate for the
//! transaction's currency and date, and the amount converted to PLN,
//! rounded to grosze.
//!
//! ## Example
//!
//! ```rust
//! use transactions2pln::prelude::*;
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//!
//! let mut rates = InMemoryRateSource::new();
//! rates.add_rate("USD", NaiveDate::from_ymd_opt(2023, 5, 2).unwrap(), Decimal::new(41823, 4));
//!
//! let options = ConversionOptions {
//!     date_format: "%Y/%m/%d".to_string(),
//!     labels: false,
//!     ..Default::default()
//! };
//! let rows = vec![Ok(vec!["2023/05/02".to_string(), "4356.12".to_string()])];
//!
//! let mut sink = DelimitedSink::new(Vec::new());
//! Converter::new(options)
//!     .run(rows, &mut sink, |_year| Ok(rates.clone()))
//!     .unwrap();
//!
//! let out = String::from_utf8(sink.into_inner().unwrap()).unwrap();
//! assert_eq!(out, "2023/05/02,4356.12,\"4,1823\",\"18218,60\"\n");
//! ```

pub mod calendar;
pub mod column;
pub mod config;
pub mod currency;
pub mod error;
pub mod number;
pub mod output;
pub mod pipeline;
pub mod rates;

pub mod prelude {
    //! Commonly used types and traits
    pub use crate::config::Settings;
    pub use crate::currency::TableGroup;
    pub use crate::error::{ConversionError, Result, RowFailure};
    pub use crate::number::NumberFormat;
    pub use crate::output::{DelimitedSink, JsonArraySink, RowSink};
    pub use crate::pipeline::{ConversionOptions, ConversionSummary, Converter};
    pub use crate::rates::{
        ExchangeRateManager, ExchangeRateSource, HttpTableFetcher, InMemoryRateSource,
        TableFetcher,
    };
}
