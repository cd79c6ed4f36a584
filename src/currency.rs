//! NBP rate tables and the currencies they publish

use crate::error::{ConversionError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const TABLE_A: &[&str] = &[
    "THB", "USD", "AUD", "HKD", "CAD", "NZD", "EUR", "HUF", "CHF", "GBP", "UAH", "JPY", "CZK",
    "DKK", "ISK", "NOK", "SEK", "RON", "BGN", "TRY", "ILS", "CLP", "PHP", "MXN", "ZAR", "BRL",
    "MYR", "IDR", "INR", "KRW", "CNY", "XDR",
];

const TABLE_B: &[&str] = &[
    "AFN", "MGA", "PAB", "ETB", "VES", "BOB", "CRC", "SVC", "NIO", "GMD", "MKD", "DZD", "BHD",
    "IQD", "JOD", "KWD", "LYD", "RSD", "TND", "MAD", "AED", "STN", "BSD", "BBD", "BZD", "BND",
    "FJD", "GYD", "JMD", "LRD", "NAD", "SRD", "TTD", "XCD", "SBD", "ZWL", "VND", "AMD", "CVE",
    "AWG", "BIF", "XOF", "XAF", "XPF", "DJF", "GNF", "KMF", "CDF", "RWF", "EGP", "GIP", "LBP",
    "SSP", "SDG", "SYP", "GHS", "HTG", "PYG", "ANG", "PGK", "LAK", "MWK", "ZMW", "AOA", "MMK",
    "GEL", "MDL", "ALL", "HNL", "SLE", "SZL", "LSL", "AZN", "MZN", "NGN", "ERN", "TWD", "TMT",
    "MRU", "TOP", "MOP", "ARS", "DOP", "COP", "CUP", "UYU", "BWP", "GTQ", "IRR", "YER", "QAR",
    "OMR", "SAR", "KHR", "BYN", "RUB", "LKR", "MVR", "MUR", "NPR", "PKR", "SCR", "PEN", "KGS",
    "TJS", "UZS", "KES", "SOS", "TZS", "UGX", "BDT", "WST", "KZT", "MNT", "VUV", "BAM",
];

/// Group of currencies the NBP publishes together in one archive file per year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableGroup {
    /// Table A: major and most traded currencies
    A,
    /// Table B: remaining currencies, published weekly
    B,
}

impl TableGroup {
    /// All groups, in lookup order
    pub const ALL: [TableGroup; 2] = [TableGroup::A, TableGroup::B];

    /// Table identifier as used in archive URLs
    pub fn id(&self) -> &'static str {
        match self {
            TableGroup::A => "a",
            TableGroup::B => "b",
        }
    }

    /// Parse from table identifier
    pub fn from_id(id: &str) -> Result<Self> {
        match id {
            "a" | "A" => Ok(TableGroup::A),
            "b" | "B" => Ok(TableGroup::B),
            _ => Err(ConversionError::UnknownTableGroup(id.to_string())),
        }
    }

    /// ISO 4217 codes published in this table
    pub fn currencies(&self) -> &'static [&'static str] {
        match self {
            TableGroup::A => TABLE_A,
            TableGroup::B => TABLE_B,
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.currencies().contains(&code)
    }

    /// First table, in `ALL` order, that publishes `code`
    pub fn for_currency(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.contains(code))
            .ok_or_else(|| ConversionError::UnknownCurrency(code.to_string()))
    }
}

impl fmt::Display for TableGroup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.id().to_uppercase())
    }
}

/// Check whether a currency option names an ISO 4217 code rather than a column.
///
/// A code is exactly three characters, upper case, and is not also the
/// name of a column header.
pub fn looks_like_currency_code(spec: &str, headers: &[String]) -> bool {
    spec.chars().count() == 3
        && spec.chars().any(char::is_uppercase)
        && !spec.chars().any(char::is_lowercase)
        && !headers.iter().any(|h| h == spec)
}
