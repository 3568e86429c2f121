//! Value transformations for ENTSO-E market documents
//!
//! This module converts the textual values found in market documents into typed values,
//! and formats values for the request and output boundaries.
//!
//! # Transformations
//!
//! 1. **Resolution parsing**: `"PT15M"` → 15 minutes, `"P1D"` → 24 hours
//! 2. **Period start parsing**: `"2024-10-01T22:00Z"` → `DateTime<Utc>`
//! 3. **Position parsing**: `"24"` → `24` (1-based)
//! 4. **Quantity parsing**: `"1234.5"` → `Some(1234.5)`, `""` → `None`
//! 5. **ISO 8601 output**: `DateTime<Utc>` → `"2024-10-01T22:00:00+00:00"`
//! 6. **Query window format**: `DateTime<Utc>` → `"202410012200"`
//! 7. **Diagnostic excerpts**: response body → truncated text
//!
//! # Example
//!
//! ```rust
//! use entsoe_data::transformations::*;
//!
//! let resolution = parse_resolution("PT60M").unwrap();
//! assert_eq!(resolution.minutes(), 60);
//!
//! let start = parse_period_start("2024-01-01T00:00Z").unwrap();
//! assert_eq!(to_iso8601(&start), "2024-01-01T00:00:00+00:00");
//!
//! assert_eq!(parse_quantity("-12.5").unwrap(), Some(-12.5));
//! ```

use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};

use crate::error::ParseError;
use crate::types::Resolution;

// ============================================================================
// Transformation 1: Resolution
// ============================================================================

/// Parse an ISO 8601 duration into a fixed-length resolution
///
/// Supports week and day designators before `T` and hour, minute and second
/// designators after it. Year and month designators have no fixed length and are
/// rejected, as is a zero duration.
///
/// # Arguments
///
/// * `value` - Duration text from the `resolution` element (e.g., "PT15M")
///
/// # Returns
///
/// * `Ok(Resolution)` - Positive fixed duration
/// * `Err(ParseError::InvalidResolution)` - Unsupported or malformed duration
///
/// # Examples
///
/// ```
/// # use entsoe_data::transformations::parse_resolution;
/// assert_eq!(parse_resolution("PT15M").unwrap().minutes(), 15);
/// assert_eq!(parse_resolution("PT1H").unwrap().minutes(), 60);
/// assert_eq!(parse_resolution("P1D").unwrap().minutes(), 1440);
/// assert!(parse_resolution("P1M").is_err());
/// assert!(parse_resolution("PT0M").is_err());
/// ```
pub fn parse_resolution(value: &str) -> Result<Resolution, ParseError> {
    let invalid = || ParseError::InvalidResolution(value.to_string());

    let upper = value.trim().to_ascii_uppercase();
    let body = upper.strip_prefix('P').ok_or_else(invalid)?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((_, "")) => return Err(invalid()),
        Some((date, time)) => (date, time),
        None => (body, ""),
    };

    let mut seconds: i64 = 0;
    for (amount, designator) in duration_components(date_part).ok_or_else(invalid)? {
        let factor = match designator {
            'W' => 604_800,
            'D' => 86_400,
            _ => return Err(invalid()),
        };
        seconds = accumulate(seconds, amount, factor).ok_or_else(invalid)?;
    }
    for (amount, designator) in duration_components(time_part).ok_or_else(invalid)? {
        let factor = match designator {
            'H' => 3_600,
            'M' => 60,
            'S' => 1,
            _ => return Err(invalid()),
        };
        seconds = accumulate(seconds, amount, factor).ok_or_else(invalid)?;
    }

    Duration::try_seconds(seconds)
        .and_then(Resolution::new)
        .ok_or_else(invalid)
}

/// Split "1H30M" into `[(1, 'H'), (30, 'M')]`; `None` on a dangling number or missing amount
fn duration_components(part: &str) -> Option<Vec<(i64, char)>> {
    let mut components = Vec::new();
    let mut digits = String::new();

    for ch in part.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else {
            if digits.is_empty() {
                return None;
            }
            components.push((digits.parse().ok()?, ch));
            digits.clear();
        }
    }

    digits.is_empty().then_some(components)
}

fn accumulate(total: i64, amount: i64, factor: i64) -> Option<i64> {
    amount.checked_mul(factor).and_then(|s| total.checked_add(s))
}

// ============================================================================
// Transformation 2: Period Start
// ============================================================================

/// Parse a `timeInterval/start` value into a UTC instant
///
/// The platform writes minute precision with a `Z` suffix ("2024-10-01T22:00Z").
/// Full RFC 3339 timestamps with seconds or an explicit offset are accepted as well
/// and normalized to UTC.
///
/// # Examples
///
/// ```
/// # use entsoe_data::transformations::parse_period_start;
/// let a = parse_period_start("2024-10-01T22:00Z").unwrap();
/// let b = parse_period_start("2024-10-02T00:00:00+02:00").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_period_start("01.10.2024 22:00").is_err());
/// ```
pub fn parse_period_start(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = value.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%MZ") {
        return Ok(naive.and_utc());
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ParseError::InvalidTimestamp(value.to_string()))
}

// ============================================================================
// Transformation 3: Position
// ============================================================================

/// Parse a 1-based point position
///
/// # Examples
///
/// ```
/// # use entsoe_data::transformations::parse_position;
/// assert_eq!(parse_position(" 96 ").unwrap(), 96);
/// assert!(parse_position("0").is_err());
/// assert!(parse_position("-1").is_err());
/// assert!(parse_position("1.5").is_err());
/// ```
pub fn parse_position(value: &str) -> Result<u32, ParseError> {
    match value.trim().parse::<u32>() {
        Ok(position) if position >= 1 => Ok(position),
        _ => Err(ParseError::InvalidPosition(value.to_string())),
    }
}

// ============================================================================
// Transformation 4: Quantity
// ============================================================================

/// Parse a point quantity or price amount
///
/// Values are returned as given: no unit conversion, no rounding, negative values
/// pass through. An empty element means "no data" and maps to `None`.
///
/// # Returns
///
/// * `Ok(None)` - Empty or whitespace-only value
/// * `Ok(Some(f64))` - Finite decimal value
/// * `Err(ParseError::InvalidQuantity)` - Not a number, or NaN/infinite
///
/// # Examples
///
/// ```
/// # use entsoe_data::transformations::parse_quantity;
/// assert_eq!(parse_quantity("4711").unwrap(), Some(4711.0));
/// assert_eq!(parse_quantity("-0.01").unwrap(), Some(-0.01));
/// assert_eq!(parse_quantity("  ").unwrap(), None);
/// assert!(parse_quantity("NaN").is_err());
/// assert!(parse_quantity("12,5").is_err());
/// ```
pub fn parse_quantity(value: &str) -> Result<Option<f64>, ParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    match trimmed.parse::<f64>() {
        Ok(quantity) if quantity.is_finite() => Ok(Some(quantity)),
        _ => Err(ParseError::InvalidQuantity(value.to_string())),
    }
}

// ============================================================================
// Transformation 5/6: Timestamp Formatting
// ============================================================================

/// ISO 8601 timeline key, second precision with explicit `+00:00` offset
pub fn to_iso8601(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// `periodStart`/`periodEnd` request parameter format (`YYYYMMDDHH00`, UTC)
///
/// Minutes are always written as `00`; the platform only accepts hour boundaries.
///
/// # Examples
///
/// ```
/// # use entsoe_data::transformations::format_query_timestamp;
/// # use chrono::{TimeZone, Utc};
/// let ts = Utc.with_ymd_and_hms(2024, 10, 1, 22, 37, 5).unwrap();
/// assert_eq!(format_query_timestamp(&ts), "202410012200");
/// ```
pub fn format_query_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y%m%d%H00").to_string()
}

// ============================================================================
// Transformation 7: Diagnostic Excerpt
// ============================================================================

/// Lossy UTF-8 excerpt of a response body for error messages
///
/// Truncates to `limit` characters (never inside a character) and appends "..."
/// when anything was cut.
pub fn body_excerpt(body: &[u8], limit: usize) -> String {
    let text = String::from_utf8_lossy(body);
    let trimmed = text.trim();

    match trimmed.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_resolution_common_values() {
        assert_eq!(parse_resolution("PT60M").unwrap().minutes(), 60);
        assert_eq!(parse_resolution("pt30m").unwrap().minutes(), 30);
        assert_eq!(parse_resolution("P7D").unwrap(), parse_resolution("P1W").unwrap());
        assert_eq!(parse_resolution("PT1H30M").unwrap().minutes(), 90);
        assert_eq!(parse_resolution("P1DT12H").unwrap().minutes(), 2160);
    }

    #[test]
    fn test_parse_resolution_rejects_calendar_units() {
        for value in ["P1Y", "P1M", "P1Y2D"] {
            match parse_resolution(value) {
                Err(ParseError::InvalidResolution(v)) => assert_eq!(v, value),
                other => panic!("Expected InvalidResolution for {}, got {:?}", value, other),
            }
        }
    }

    #[test]
    fn test_parse_resolution_rejects_malformed() {
        for value in ["", "P", "PT", "15M", "PTM", "PT15", "PT15X", "P-1D", "PT0S"] {
            assert!(parse_resolution(value).is_err(), "{} should be rejected", value);
        }
    }

    #[test]
    fn test_parse_period_start_minute_precision() {
        let ts = parse_period_start("2024-01-01T00:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_period_start_normalizes_offset() {
        let ts = parse_period_start("2024-03-31T03:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_period_start_invalid() {
        match parse_period_start("yesterday") {
            Err(ParseError::InvalidTimestamp(v)) => assert_eq!(v, "yesterday"),
            other => panic!("Expected InvalidTimestamp, got {:?}", other),
        }
        assert!(parse_period_start("2024-13-01T00:00Z").is_err());
    }

    #[test]
    fn test_parse_quantity_keeps_precision() {
        assert_eq!(parse_quantity("123.456789").unwrap(), Some(123.456789));
        assert_eq!(parse_quantity("0").unwrap(), Some(0.0));
        assert!(parse_quantity("inf").is_err());
        assert!(parse_quantity("abc").is_err());
    }

    #[test]
    fn test_iso8601_output() {
        let ts = Utc.with_ymd_and_hms(2024, 10, 1, 22, 15, 0).unwrap();
        assert_eq!(to_iso8601(&ts), "2024-10-01T22:15:00+00:00");
    }

    #[test]
    fn test_body_excerpt_truncates_on_char_boundary() {
        let body = "Größenordnung überschritten".as_bytes();
        assert_eq!(body_excerpt(body, 4), "Größ...");
        assert_eq!(body_excerpt(body, 100), "Größenordnung überschritten");
    }

    #[test]
    fn test_body_excerpt_lossy_on_invalid_utf8() {
        let excerpt = body_excerpt(&[0x3c, 0xff, 0x3e], 10);
        assert_eq!(excerpt, "<\u{FFFD}>");
    }

    #[test]
    fn test_body_excerpt_exact_limit_not_marked() {
        assert_eq!(body_excerpt(b"abcd", 4), "abcd");
        assert_eq!(body_excerpt(b"abcde", 4), "abcd...");
    }
}
