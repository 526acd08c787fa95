//! Lenient date parsing for the two sources.
//!
//! Trade timestamps are written day-first (`02-12-2024 22:50` is 2 December);
//! the sentiment index uses ISO dates, with month-first as the fallback for
//! slash-separated values.

use chrono::{NaiveDate, NaiveDateTime};

const DAY_FIRST_DATETIME: &[&str] = &[
    "%d-%m-%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
];

const DAY_FIRST_DATE: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y"];

const ISO_DATETIME: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const ISO_DATE: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const MONTH_FIRST_DATETIME: &[&str] = &["%m/%d/%Y %H:%M", "%m/%d/%Y %H:%M:%S"];

const MONTH_FIRST_DATE: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];

fn parse_datetime(value: &str, formats: &[&str]) -> Option<NaiveDateTime> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

fn parse_date(value: &str, formats: &[&str]) -> Option<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Parses a trade timestamp, reading ambiguous dates day-first.
///
/// Date-only values land at midnight. Returns `None` when nothing matches.
#[must_use]
pub fn parse_day_first_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    parse_datetime(value, DAY_FIRST_DATETIME)
        .or_else(|| parse_datetime(value, ISO_DATETIME))
        .or_else(|| parse_date(value, DAY_FIRST_DATE).and_then(|d| d.and_hms_opt(0, 0, 0)))
        .or_else(|| parse_date(value, ISO_DATE).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// Parses a sentiment date. Any time component is discarded.
#[must_use]
pub fn parse_standard_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    parse_date(value, ISO_DATE)
        .or_else(|| parse_datetime(value, ISO_DATETIME).map(|dt| dt.date()))
        .or_else(|| parse_date(value, MONTH_FIRST_DATE))
        .or_else(|| parse_datetime(value, MONTH_FIRST_DATETIME).map(|dt| dt.date()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn day_first_reads_day_before_month() {
        let ts = parse_day_first_datetime("02-12-2024 22:50").unwrap();
        assert_eq!(ts.date(), ymd(2024, 12, 2));
        assert_eq!(ts.format("%H:%M").to_string(), "22:50");
    }

    #[test]
    fn day_first_accepts_slashes_seconds_and_dates() {
        assert_eq!(
            parse_day_first_datetime("13/01/2024 09:15:30").unwrap().date(),
            ymd(2024, 1, 13)
        );
        assert_eq!(
            parse_day_first_datetime("05.03.2024").unwrap().date(),
            ymd(2024, 3, 5)
        );
    }

    #[test]
    fn day_first_accepts_iso() {
        assert_eq!(
            parse_day_first_datetime("2024-03-05T10:00:00").unwrap().date(),
            ymd(2024, 3, 5)
        );
        assert_eq!(
            parse_day_first_datetime("2024-03-05").unwrap().date(),
            ymd(2024, 3, 5)
        );
    }

    #[test]
    fn day_first_rejects_garbage() {
        assert!(parse_day_first_datetime("").is_none());
        assert!(parse_day_first_datetime("not a date").is_none());
        assert!(parse_day_first_datetime("32-01-2024 10:00").is_none());
    }

    #[test]
    fn standard_date_prefers_iso_then_month_first() {
        assert_eq!(parse_standard_date("2024-01-02"), Some(ymd(2024, 1, 2)));
        assert_eq!(parse_standard_date("01/02/2024"), Some(ymd(2024, 1, 2)));
        assert_eq!(
            parse_standard_date("2024-01-02 00:00:00"),
            Some(ymd(2024, 1, 2))
        );
        assert_eq!(parse_standard_date(" 2024/01/02 "), Some(ymd(2024, 1, 2)));
    }

    #[test]
    fn standard_date_rejects_garbage() {
        assert!(parse_standard_date("").is_none());
        assert!(parse_standard_date("yesterday").is_none());
        assert!(parse_standard_date("2024-13-01").is_none());
    }
}
