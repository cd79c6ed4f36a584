//! Decimal parsing, formatting and the fixed-precision amount arithmetic

use crate::error::{ConversionError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Significant digits kept by amount arithmetic
pub const AMOUNT_PRECISION: u32 = 10;

/// Fractional digits of a converted PLN amount
pub const AMOUNT_SCALE: u32 = 2;

/// How decimals are written in the output.
///
/// Defaults to the Polish convention: decimal comma, no digit grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub decimal_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: ',',
        }
    }
}

impl NumberFormat {
    /// Format of rates in NBP archive tables, independent of output settings
    pub const NBP: NumberFormat = NumberFormat {
        decimal_separator: ',',
    };

    /// Parse a decimal written with this profile's separator
    pub fn parse(&self, text: &str) -> Result<Decimal> {
        let trimmed = text.trim();
        let normalized = if self.decimal_separator == '.' {
            trimmed.to_string()
        } else {
            trimmed.replace(self.decimal_separator, ".")
        };
        Decimal::from_str(&normalized)
            .map_err(|_| ConversionError::InvalidNumber(text.to_string()))
    }

    /// Format a decimal, keeping its scale, with this profile's separator
    pub fn format(&self, value: Decimal) -> String {
        let text = value.to_string();
        if self.decimal_separator == '.' {
            text
        } else {
            text.replace('.', &self.decimal_separator.to_string())
        }
    }
}

/// Why an amount cell could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountError {
    /// The cell is not a number
    NotANumber,
    /// A well-formed number outside the range of decimal arithmetic
    OutOfRange,
}

/// Parse a transaction amount written with a decimal point.
///
/// Accepts plain and scientific notation.
pub fn parse_amount(text: &str) -> std::result::Result<Decimal, AmountError> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| {
            if is_numeric_literal(trimmed) {
                AmountError::OutOfRange
            } else {
                AmountError::NotANumber
            }
        })
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`, with at least one mantissa digit
fn is_numeric_literal(text: &str) -> bool {
    let (mantissa, exponent) = match text.find(['e', 'E']) {
        Some(i) => (&text[..i], Some(&text[i + 1..])),
        None => (text, None),
    };

    let unsigned = mantissa.strip_prefix(['+', '-']).unwrap_or(mantissa);
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let mantissa_ok = !(int_part.is_empty() && frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit());

    let exponent_ok = exponent.map_or(true, |e| {
        let digits = e.strip_prefix(['+', '-']).unwrap_or(e);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    });

    mantissa_ok && exponent_ok
}

/// Multiply `amount` by `rate` and round to grosze.
///
/// The product is first rounded to [`AMOUNT_PRECISION`] significant digits,
/// then to [`AMOUNT_SCALE`] fractional digits, both with banker's rounding.
/// Returns `None` when the result does not fit the precision.
pub fn convert_amount(amount: Decimal, rate: Decimal) -> Option<Decimal> {
    let product = round_significant(amount.checked_mul(rate)?, AMOUNT_PRECISION)?;
    let mut rounded =
        product.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(AMOUNT_SCALE);
    if rounded.scale() != AMOUNT_SCALE || digit_count(rounded) > AMOUNT_PRECISION {
        return None;
    }
    Some(rounded)
}

fn round_significant(value: Decimal, digits: u32) -> Option<Decimal> {
    let total = digit_count(value);
    if total <= digits {
        return Some(value);
    }
    let excess = total - digits;
    // integer part alone is wider than the precision
    let scale = value.scale().checked_sub(excess)?;
    Some(value.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven))
}

fn digit_count(value: Decimal) -> u32 {
    match value.mantissa().unsigned_abs() {
        0 => 1,
        m => m.ilog10() + 1,
    }
}
