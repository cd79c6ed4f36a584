//! Parsed NBP archive table for one table group and year

use crate::calendar::fallback_window;
use crate::currency::TableGroup;
use crate::error::{ConversionError, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Terminator};
use hashbrown::HashMap;
use std::collections::BTreeMap;

/// First cell of the row listing currency codes
const CODE_HEADER: &str = "kod ISO";

/// Date format of the first cell of a data row
const ROW_DATE_FORMAT: &str = "%Y%m%d";

/// Daily rates of one table group for one year
///
/// Rates are kept as the raw strings published in the table, one per
/// currency position. The date column is not part of the value rows.
#[derive(Debug, Clone)]
pub struct RateTable {
    group: TableGroup,
    rows: BTreeMap<NaiveDate, Vec<String>>,
    positions: HashMap<String, usize>,
}

impl RateTable {
    /// Create an empty table
    pub fn new(group: TableGroup) -> Self {
        Self {
            group,
            rows: BTreeMap::new(),
            positions: HashMap::new(),
        }
    }

    /// Parse a raw archive file encoded in Windows-1250
    pub fn from_cp1250(group: TableGroup, bytes: &[u8]) -> Result<Self> {
        let (text, _, had_errors) = encoding_rs::WINDOWS_1250.decode(bytes);
        if had_errors {
            log::warn!("Table {} contains bytes invalid in Windows-1250", group);
        }
        Self::parse(group, &text)
    }

    /// Parse `;`-delimited, unquoted table text.
    ///
    /// Rows starting with `kod ISO` set the currency positions, rows starting
    /// with a `YYYYMMDD` date hold rates. Anything else is skipped. The first
    /// row seen for a date wins.
    pub fn parse(group: TableGroup, text: &str) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .terminator(Terminator::CRLF)
            .from_reader(text.as_bytes());

        let mut table = Self::new(group);
        for record in reader.records() {
            let record = record?;
            let first = match record.get(0) {
                Some(cell) => cell,
                None => continue,
            };

            if let Ok(date) = parse_row_date(first) {
                let values: Vec<String> = record.iter().skip(1).map(str::to_string).collect();
                table.insert_row(date, values);
            } else if first == CODE_HEADER {
                table.set_positions(record.iter().skip(1));
            }
        }

        log::debug!(
            "Parsed table {}: {} dates, {} currencies",
            group,
            table.rows.len(),
            table.positions.len()
        );
        Ok(table)
    }

    /// Add a row of rates, keeping an existing row for the same date
    pub fn insert_row(&mut self, date: NaiveDate, values: Vec<String>) {
        self.rows.entry(date).or_insert(values);
    }

    /// Record currency positions from a `kod ISO` row, excluding its first cell
    pub fn set_positions<'a>(&mut self, codes: impl IntoIterator<Item = &'a str>) {
        for (i, code) in codes.into_iter().enumerate() {
            self.positions.insert(code.to_string(), i);
        }
    }

    pub fn group(&self) -> TableGroup {
        self.group
    }

    /// Number of dates with published rates
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rates row for an exact date
    pub fn row(&self, date: NaiveDate) -> Option<&[String]> {
        self.rows.get(&date).map(|v| v.as_slice())
    }

    /// Position of a currency in the value rows
    pub fn position(&self, code: &str) -> Option<usize> {
        self.positions.get(code).copied()
    }

    /// Newest row on or up to `days` before `date`, with the date it was published for
    pub fn row_on_or_before(&self, date: NaiveDate, days: i64) -> Result<(NaiveDate, &[String])> {
        fallback_window(date, days)
            .find_map(|candidate| self.row(candidate).map(|row| (candidate, row)))
            .ok_or_else(|| ConversionError::RateUnavailable {
                date,
                table: self.group.to_string(),
            })
    }

    /// Raw rate string of `code` on `date`, applying the fallback window
    pub fn raw_rate(&self, code: &str, date: NaiveDate, days: i64) -> Result<&str> {
        let (found, row) = self.row_on_or_before(date, days)?;
        if found != date {
            log::debug!("No {} rate on {}, using {}", code, date, found);
        }

        let missing = || ConversionError::MissingCurrencyPosition {
            code: code.to_string(),
            table: self.group.to_string(),
        };
        let position = self.position(code).ok_or_else(missing)?;
        row.get(position).map(String::as_str).ok_or_else(missing)
    }
}

fn parse_row_date(cell: &str) -> chrono::ParseResult<NaiveDate> {
    NaiveDate::parse_from_str(cell, ROW_DATE_FORMAT)
}
