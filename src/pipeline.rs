//! Row-by-row conversion of transactions to PLN
//!
//! The converter resolves the currency, amount and date columns once, then
//! for every data row:
//!
//! 1. finds the transaction date and rolls weekends back to Friday,
//! 2. fixes the rate year from the first row's date,
//! 3. looks up the NBP rate for the row's currency,
//! 4. appends the rate and the rounded PLN amount to the row.
//!
//! The first failing row aborts the run. Data rows are numbered from 1; a
//! header row is not counted.

use crate::calendar::last_business_day;
use crate::column::resolve_column;
use crate::currency::looks_like_currency_code;
use crate::error::{ConversionError, Result, RowFailure};
use crate::number::{convert_amount, parse_amount, AmountError, NumberFormat};
use crate::output::RowSink;
use crate::rates::{ExchangeRateManager, ExchangeRateSource, TableFetcher, DEFAULT_TABLE_URL};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

/// Header appended for the rate column
pub const RATE_HEADER: &str = "exchange rate to PLN";

/// Header appended for the converted amount column
pub const AMOUNT_HEADER: &str = "amount in PLN";

/// Default transaction date format, the Polish short date
pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// How to read transactions from the input
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// ISO 4217 code, or a column holding the code
    pub currency: String,
    /// Amount column; the last column when absent
    pub amount_column: Option<String>,
    /// Date column; every cell is tried when absent
    pub date_column: Option<String>,
    /// strftime-style pattern of transaction dates
    pub date_format: String,
    /// Treat the first row as column headers
    pub labels: bool,
    /// How the appended rate and PLN amount are written
    pub number_format: NumberFormat,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            amount_column: None,
            date_column: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            labels: true,
            number_format: NumberFormat::default(),
        }
    }
}

/// Where the currency of a row comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencySource {
    /// Same code for every row
    Fixed(String),
    /// Code read from this column of each row
    Column(usize),
}

/// Column options resolved against the input headers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    pub currency: CurrencySource,
    pub amount: Option<usize>,
    pub date: Option<usize>,
}

impl ColumnPlan {
    pub fn resolve(options: &ConversionOptions, headers: &[String]) -> Result<Self> {
        let currency = if looks_like_currency_code(&options.currency, headers) {
            CurrencySource::Fixed(options.currency.clone())
        } else {
            match resolve_column(Some(&options.currency), headers) {
                Ok(Some(index)) => CurrencySource::Column(index),
                _ => return Err(column_error("currency", &options.currency)),
            }
        };

        let amount = resolve_column(options.amount_column.as_deref(), headers).map_err(|_| {
            column_error("amount-column", options.amount_column.as_deref().unwrap_or(""))
        })?;
        let date = resolve_column(options.date_column.as_deref(), headers).map_err(|_| {
            column_error("date-column", options.date_column.as_deref().unwrap_or(""))
        })?;

        Ok(Self {
            currency,
            amount,
            date,
        })
    }
}

fn column_error(param: &str, value: &str) -> ConversionError {
    ConversionError::ColumnParameter {
        param: param.to_string(),
        value: value.to_string(),
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Data rows converted
    pub rows: usize,
    /// Rate tables downloaded
    pub tables_fetched: usize,
    /// Year of the rate tables, fixed by the first row
    pub year: Option<i32>,
}

/// Transaction converter
pub struct Converter {
    options: ConversionOptions,
    source_name: String,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            options,
            source_name: "input".to_string(),
        }
    }

    /// Name of the input used in error messages
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert `rows` using NBP tables downloaded by `fetcher` into `scratch_dir`
    pub fn run_with_nbp<I, K>(
        &self,
        rows: I,
        sink: &mut K,
        fetcher: Arc<dyn TableFetcher>,
        scratch_dir: &Path,
        url_pattern: Option<&str>,
    ) -> Result<ConversionSummary>
    where
        I: IntoIterator<Item = Result<Vec<String>>>,
        K: RowSink + ?Sized,
    {
        let url_pattern = url_pattern.unwrap_or(DEFAULT_TABLE_URL);
        self.run(rows, sink, |year| {
            Ok(ExchangeRateManager::new(fetcher.clone(), scratch_dir, year).with_url_pattern(url_pattern))
        })
    }

    /// Convert `rows` into `sink`.
    ///
    /// `open_rates` is called once, with the year of the first data row
    /// after weekend normalization.
    pub fn run<I, K, S, F>(&self, rows: I, sink: &mut K, mut open_rates: F) -> Result<ConversionSummary>
    where
        I: IntoIterator<Item = Result<Vec<String>>>,
        K: RowSink + ?Sized,
        S: ExchangeRateSource,
        F: FnMut(i32) -> Result<S>,
    {
        let mut rows = rows.into_iter();

        let headers = if self.options.labels {
            match rows.next() {
                Some(row) => row?,
                None => {
                    return Err(ConversionError::EmptyInput {
                        source_name: self.source_name.clone(),
                    })
                }
            }
        } else {
            Vec::new()
        };

        let plan = ColumnPlan::resolve(&self.options, &headers)?;
        log::debug!("Column plan: {:?}", plan);

        if self.options.labels {
            let mut out_headers = headers;
            out_headers.push(RATE_HEADER.to_string());
            out_headers.push(AMOUNT_HEADER.to_string());
            sink.write_header(&out_headers)?;
        }

        let mut rates: Option<S> = None;
        let mut summary = ConversionSummary::default();

        for (i, row) in rows.enumerate() {
            let number = i + 1;
            let mut row = row?;

            let date = self
                .row_date(&plan, &row)
                .map_err(|cause| ConversionError::row(number, cause))?;
            let date = last_business_day(date);

            let source = match rates {
                Some(ref mut source) => source,
                None => {
                    summary.year = Some(date.year());
                    rates.insert(open_rates(date.year())?)
                }
            };

            self.convert_row(&plan, &mut row, date, source)
                .map_err(|cause| ConversionError::row(number, cause))?;
            sink.write_row(&row).map_err(|e| match e {
                ConversionError::RowWidth { labels, cells } => {
                    ConversionError::row(number, RowFailure::RowWidth { labels, cells })
                }
                other => other,
            })?;
            summary.rows += 1;
        }

        sink.finish()?;

        summary.tables_fetched = rates.as_ref().map_or(0, |r| r.tables_fetched());
        log::info!(
            "Converted {} rows using {} rate tables",
            summary.rows,
            summary.tables_fetched
        );
        Ok(summary)
    }

    fn row_date(&self, plan: &ColumnPlan, row: &[String]) -> std::result::Result<NaiveDate, RowFailure> {
        let format = &self.options.date_format;
        match plan.date {
            Some(index) => parse_date(cell(row, index)?, format)
                .ok_or(RowFailure::DateFormatMismatch { column: index + 1 }),
            None => row
                .iter()
                .find_map(|c| parse_date(c, format))
                .ok_or(RowFailure::NoDateFound),
        }
    }

    fn convert_row<S: ExchangeRateSource>(
        &self,
        plan: &ColumnPlan,
        row: &mut Vec<String>,
        date: NaiveDate,
        rates: &mut S,
    ) -> std::result::Result<(), RowFailure> {
        let currency = match &plan.currency {
            CurrencySource::Fixed(code) => code.clone(),
            CurrencySource::Column(index) => cell(row, *index)?.to_string(),
        };

        let rate = rates
            .exchange_rate(&currency, date)
            .map_err(|e| RowFailure::RateLookup(e.to_string()))?;

        let amount_text = match plan.amount {
            Some(index) => cell(row, index)?,
            None => row
                .last()
                .map(String::as_str)
                .ok_or(RowFailure::MissingColumn { column: 1 })?,
        };
        let amount = parse_amount(amount_text).map_err(|e| match e {
            AmountError::NotANumber => RowFailure::InvalidAmount(amount_text.to_string()),
            AmountError::OutOfRange => RowFailure::AmountPrecisionExceeded(amount_text.to_string()),
        })?;
        let amount_pln = convert_amount(amount, rate)
            .ok_or_else(|| RowFailure::AmountPrecisionExceeded(amount_text.to_string()))?;

        log::trace!("{} {} on {} at {} = {} PLN", amount, currency, date, rate, amount_pln);

        let number_format = self.options.number_format;
        row.push(number_format.format(rate));
        row.push(number_format.format(amount_pln));
        Ok(())
    }
}

fn cell(row: &[String], index: usize) -> std::result::Result<&str, RowFailure> {
    row.get(index)
        .map(String::as_str)
        .ok_or(RowFailure::MissingColumn { column: index + 1 })
}

/// Parse a date, or the date part of a date-time, with a strftime-style pattern
pub fn parse_date(text: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, format)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, format)
                .ok()
                .map(|dt| dt.date())
        })
}

/// CSV reader for transaction files: no header handling, rows of any length
pub fn input_reader<R: Read>(inner: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(inner)
}

/// Rows of a transaction file as owned cells
pub fn read_rows<R: Read>(reader: csv::Reader<R>) -> impl Iterator<Item = Result<Vec<String>>> {
    reader.into_records().map(|record| {
        record
            .map(|r| r.iter().map(str::to_string).collect())
            .map_err(ConversionError::from)
    })
}
