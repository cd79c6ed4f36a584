//! Column addressing by header, 1-based number or spreadsheet letter

use crate::error::{ConversionError, Result};

/// Resolve a column specifier to a zero-based index.
///
/// - empty or absent: `Ok(None)`, the caller picks its own default
/// - longer than one character: header name looked up in `headers`
/// - one digit: 1-based column number
/// - one letter: spreadsheet column, `A`/`a` is the first
///
/// Only single-letter columns are supported, there is no `AA` style.
pub fn resolve_column(spec: Option<&str>, headers: &[String]) -> Result<Option<usize>> {
    let spec = match spec {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };

    let mut chars = spec.chars();
    let first = chars.next();
    match (first, chars.next()) {
        (Some(c), None) => resolve_single(c, spec).map(Some),
        _ => headers
            .iter()
            .position(|h| h == spec)
            .map(Some)
            .ok_or_else(|| ConversionError::ColumnNotFound(spec.to_string())),
    }
}

fn resolve_single(c: char, spec: &str) -> Result<usize> {
    if let Some(digit) = c.to_digit(10) {
        // "0" has no 1-based meaning
        return (digit as usize)
            .checked_sub(1)
            .ok_or_else(|| ConversionError::ColumnNotFound(spec.to_string()));
    }

    let lower = c.to_ascii_lowercase();
    if lower.is_ascii_lowercase() {
        Ok((lower as u8 - b'a') as usize)
    } else {
        Err(ConversionError::ColumnNotFound(spec.to_string()))
    }
}
