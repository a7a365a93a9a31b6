//! Rental quote arithmetic.
//!
//! The quote is advisory: it is shown to the renter and sent along with the
//! booking request, and the backend recomputes it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Result of pricing a rental window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub days: i64,
    pub price_per_day: f64,
    pub total_price: f64,
}

impl Quote {
    pub fn is_empty(&self) -> bool {
        self.days == 0
    }
}

/// Parse a calendar date (`2024-01-31`) or an RFC 3339 timestamp.
///
/// Bare dates are taken as midnight UTC; timestamps are converted to UTC.
pub fn parse_instant(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// Whole rental days between `start` and `end`, rounded up.
///
/// Zero when either side is missing or unparseable, or when `end` does not
/// come after `start`.
pub fn rental_days(start: &str, end: &str) -> i64 {
    let (Some(start), Some(end)) = (parse_instant(start), parse_instant(end)) else {
        return 0;
    };

    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 0;
    }

    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Price a rental of `price_per_day` between `start` and `end`
pub fn quote(price_per_day: f64, start: &str, end: &str) -> Quote {
    let days = rental_days(start, end);
    let total_price = if days > 0 {
        price_per_day * days as f64
    } else {
        0.0
    };

    Quote {
        days,
        price_per_day,
        total_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_day_rental() {
        let q = quote(1000.0, "2024-01-01", "2024-01-03");
        assert_eq!(q.days, 2);
        assert_eq!(q.total_price, 2000.0);
    }

    #[test]
    fn test_same_day_is_zero() {
        let q = quote(1000.0, "2024-01-01", "2024-01-01");
        assert_eq!(q.days, 0);
        assert_eq!(q.total_price, 0.0);
        assert!(q.is_empty());
    }

    #[test]
    fn test_reversed_dates_are_zero() {
        assert_eq!(rental_days("2024-01-05", "2024-01-01"), 0);
        assert_eq!(quote(750.0, "2024-01-05", "2024-01-01").total_price, 0.0);
    }

    #[test]
    fn test_invalid_or_missing_dates_are_zero() {
        assert_eq!(rental_days("", "2024-01-03"), 0);
        assert_eq!(rental_days("2024-01-01", "next tuesday"), 0);
        assert_eq!(rental_days("2024-02-30", "2024-03-02"), 0);
    }

    #[test]
    fn test_partial_day_rounds_up() {
        assert_eq!(
            rental_days("2024-01-01T10:00:00Z", "2024-01-02T11:00:00Z"),
            2
        );
        assert_eq!(
            rental_days("2024-01-01T00:00:00Z", "2024-01-01T00:00:01Z"),
            1
        );
    }

    #[test]
    fn test_offsets_are_normalized() {
        // Same instant expressed in two zones
        assert_eq!(
            rental_days("2024-01-01T05:30:00+05:30", "2024-01-02T00:00:00Z"),
            1
        );
    }

    #[test]
    fn test_crosses_month_and_leap_day() {
        assert_eq!(rental_days("2024-02-27", "2024-03-02"), 4);
    }
}
