//! Business-day calendar used for rate lookups
//!
//! The NBP publishes no tables on weekends and bank holidays. Transaction
//! dates are first rolled back from a weekend to the preceding Friday, and
//! a date with no published table falls back to the nearest earlier one
//! inside a short window.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Number of days before the requested date searched for a published rate
pub const RATE_FALLBACK_DAYS: i64 = 4;

/// Check if date is a weekend
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Roll a weekend date back to the preceding Friday.
///
/// Saturday moves back one day, Sunday two, weekdays are unchanged.
pub fn last_business_day(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

/// Candidate dates for a rate lookup, newest first.
///
/// Yields `date` followed by the `days` preceding days.
pub fn fallback_window(date: NaiveDate, days: i64) -> impl Iterator<Item = NaiveDate> {
    (0..=days).map(move |offset| date - Duration::days(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekend_detection() {
        assert!(is_weekend(ymd(2023, 4, 29))); // Saturday
        assert!(is_weekend(ymd(2023, 4, 30))); // Sunday
        assert!(!is_weekend(ymd(2023, 4, 28)));
    }

    #[test]
    fn test_last_business_day() {
        let friday = ymd(2023, 4, 28);
        assert_eq!(last_business_day(ymd(2023, 4, 29)), friday);
        assert_eq!(last_business_day(ymd(2023, 4, 30)), friday);
        assert_eq!(last_business_day(friday), friday);
        assert_eq!(last_business_day(ymd(2023, 5, 1)), ymd(2023, 5, 1));
    }

    #[test]
    fn test_weekend_rollback_crosses_year_boundary() {
        // 2023-01-01 is a Sunday
        assert_eq!(last_business_day(ymd(2023, 1, 1)), ymd(2022, 12, 30));
    }

    #[test]
    fn test_fallback_window() {
        let dates: Vec<_> = fallback_window(ymd(2023, 5, 4), RATE_FALLBACK_DAYS).collect();
        assert_eq!(
            dates,
            vec![
                ymd(2023, 5, 4),
                ymd(2023, 5, 3),
                ymd(2023, 5, 2),
                ymd(2023, 5, 1),
                ymd(2023, 4, 30),
            ]
        );
    }
}
