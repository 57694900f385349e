//! Transaction date parsing
//!
//! Transaction sources hand us dates in several shapes: plain `YYYY-MM-DD`,
//! RFC 3339 timestamps from hosted stores, and `MM/DD/YYYY` from bank CSVs.
//! Everything is reduced to a calendar date here.
//!
//! Timestamps with an offset are converted to UTC before the date is taken,
//! so a given instant always lands in the same month bucket regardless of
//! where the process runs. Naive timestamps are read as UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::{Error, Result};

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a transaction date from any supported representation
pub fn parse_transaction_date(input: &str) -> Result<NaiveDate> {
    let s = input.trim();

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).date_naive());
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }

    Err(Error::InvalidData(format!("Unrecognized date: {}", input)))
}

/// First day of a lookback window ending at `today`
pub fn lookback_start(today: NaiveDate, days: u32) -> NaiveDate {
    today - Duration::days(days as i64)
}

/// Serde adapter: reads any supported date form, writes `YYYY-MM-DD`
pub mod flexible_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&date.format("%Y-%m-%d"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_transaction_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(parse_transaction_date("2024-03-15").unwrap(), ymd(2024, 3, 15));
    }

    #[test]
    fn test_parse_us_bank_date() {
        assert_eq!(parse_transaction_date("07/15/2023").unwrap(), ymd(2023, 7, 15));
    }

    #[test]
    fn test_parse_utc_timestamp() {
        assert_eq!(
            parse_transaction_date("2024-03-31T23:30:00Z").unwrap(),
            ymd(2024, 3, 31)
        );
        assert_eq!(
            parse_transaction_date("2024-03-31T23:30:00.123Z").unwrap(),
            ymd(2024, 3, 31)
        );
    }

    #[test]
    fn test_offset_timestamp_uses_utc_date() {
        // 22:00 in UTC-05:00 is already the next day in UTC
        assert_eq!(
            parse_transaction_date("2024-03-31T22:00:00-05:00").unwrap(),
            ymd(2024, 4, 1)
        );
        // 01:00 in UTC+02:00 is still the previous day in UTC
        assert_eq!(
            parse_transaction_date("2024-04-01T01:00:00+02:00").unwrap(),
            ymd(2024, 3, 31)
        );
    }

    #[test]
    fn test_parse_naive_timestamp() {
        assert_eq!(
            parse_transaction_date("2024-02-29 08:15:00").unwrap(),
            ymd(2024, 2, 29)
        );
        assert_eq!(
            parse_transaction_date("2024-02-29T08:15:00").unwrap(),
            ymd(2024, 2, 29)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_transaction_date("next tuesday").is_err());
        assert!(parse_transaction_date("").is_err());
    }

    #[test]
    fn test_lookback_start() {
        assert_eq!(lookback_start(ymd(2024, 3, 31), 90), ymd(2024, 1, 1));
        assert_eq!(lookback_start(ymd(2024, 3, 31), 0), ymd(2024, 3, 31));
    }
}
