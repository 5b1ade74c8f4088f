//! Timestamp parsing for the date conversion operation.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

/// A point in time, always UTC.
pub type Timestamp = DateTime<Utc>;

/// Errors that can occur during timestamp parsing.
#[derive(Debug, Error)]
pub enum TimestampError {
    /// The timestamp string is empty.
    #[error("empty timestamp string")]
    EmptyString,

    /// The timestamp value is invalid.
    #[error("invalid timestamp: {0}")]
    InvalidFormat(String),
}

/// Returns the current UTC time as an ISO 8601 formatted string.
#[must_use]
pub fn iso_timestamp() -> String {
    format_iso8601(&Utc::now())
}

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Formats a timestamp as an ISO 8601 string with microsecond precision.
#[must_use]
pub fn format_iso8601(dt: &Timestamp) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

/// Parses a timestamp from a string.
///
/// Supports Unix timestamps (seconds or milliseconds, chosen by digit
/// count), RFC 3339 / ISO 8601 strings, and a handful of common date
/// formats.
///
/// # Errors
///
/// Returns `TimestampError` if the input cannot be parsed.
pub fn parse_timestamp(input: &str) -> Result<Timestamp, TimestampError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(TimestampError::EmptyString);
    }

    if let Ok(num) = trimmed.parse::<f64>() {
        return parse_unix_timestamp(num);
    }

    // RFC 3339, with 'Z' normalized to an explicit offset.
    let normalized = trimmed.replace('Z', "+00:00");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.with_timezone(&Utc));
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in formats {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for fmt in date_formats {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, fmt) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(Utc.from_utc_datetime(&naive));
            }
        }
    }

    Err(TimestampError::InvalidFormat(trimmed.to_string()))
}

/// Parses a numeric Unix timestamp, treating values with more than ten
/// integer digits as milliseconds.
pub fn parse_unix_timestamp(value: f64) -> Result<Timestamp, TimestampError> {
    let int_part = value.trunc().abs() as i64;
    let digits = if int_part == 0 {
        1
    } else {
        int_part.to_string().len()
    };

    let (secs, nanos) = if digits > 10 {
        let millis = value as i64;
        (millis / 1000, ((millis % 1000) * 1_000_000) as u32)
    } else {
        let secs = value.trunc() as i64;
        let nanos = (value.fract().abs() * 1_000_000_000.0) as u32;
        (secs, nanos)
    };

    Utc.timestamp_opt(secs, nanos)
        .single()
        .ok_or_else(|| TimestampError::InvalidFormat(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse_timestamp("2023-10-05T14:30:00Z").unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 10);
        assert_eq!(dt.day(), 5);
    }

    #[test]
    fn test_parse_naive_datetime() {
        let dt = parse_timestamp("2023-10-05 14:30:00").unwrap();
        assert_eq!(dt.day(), 5);
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_timestamp("2023-10-05").unwrap();
        assert_eq!(dt.month(), 10);
    }

    #[test]
    fn test_parse_unix_seconds() {
        let dt = parse_timestamp("1696512000").unwrap();
        assert_eq!(dt.year(), 2023);
    }

    #[test]
    fn test_parse_unix_milliseconds() {
        let dt = parse_timestamp("1696512000000").unwrap();
        assert_eq!(dt.year(), 2023);
    }

    #[test]
    fn test_parse_empty_string() {
        assert!(matches!(
            parse_timestamp("  "),
            Err(TimestampError::EmptyString)
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_timestamp("not a date"),
            Err(TimestampError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
    }
}
