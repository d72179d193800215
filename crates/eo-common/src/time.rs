//! Time handling for product sensing intervals.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Sensing start/end of a product. Either bound may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SensingInterval {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl SensingInterval {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// An interval with neither bound known.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// True when neither bound is known.
    pub fn is_unknown(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Single acquisition time representing the whole product.
    ///
    /// The midpoint when both bounds are known, the known bound when only one
    /// is, `None` ("not-a-time") otherwise.
    pub fn midpoint(&self) -> Option<DateTime<Utc>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(start + (end - start) / 2),
            (Some(t), None) | (None, Some(t)) => Some(t),
            (None, None) => None,
        }
    }

    /// `[start, end]` as ISO-8601 strings, `None` for unknown bounds.
    pub fn to_iso_pair(&self) -> [Option<String>; 2] {
        [self.start.map(format_iso), self.end.map(format_iso)]
    }

    /// Keep known bounds of `self`, filling unknown ones from `other`.
    pub fn or(self, other: SensingInterval) -> Self {
        Self {
            start: self.start.or(other.start),
            end: self.end.or(other.end),
        }
    }
}

/// Format a timestamp as ISO-8601 with second precision and a `Z` suffix.
pub fn format_iso(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse a timestamp as found in EO product headers and filenames.
///
/// Supports:
/// - RFC 3339 / ISO 8601: `2023-01-01T10:10:10.123456Z`
/// - ISO 8601 without zone (UTC assumed): `2023-01-01T10:10:10`
/// - Compact with `T`: `20230101T101010` (Sentinel naming)
/// - Compact digits with optional fraction and `Z`: `20230101084500Z`,
///   `20230101121241.885000000Z` (EUMETSAT native naming and headers)
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    parse_compact(s).ok_or_else(|| TimeParseError::InvalidFormat(s.to_string()))
}

/// Parse `YYYYMMDD[T]HHMMSS[.fff...][Z]`.
fn parse_compact(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_suffix('Z').unwrap_or(s);
    let (whole, fraction) = match s.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (s, None),
    };

    if !whole.is_ascii() {
        return None;
    }

    let digits: String = match whole.len() {
        15 if whole.as_bytes()[8] == b'T' => format!("{}{}", &whole[..8], &whole[9..]),
        14 => whole.to_string(),
        _ => return None,
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = digits[0..4].parse().ok()?;
    let month: u32 = digits[4..6].parse().ok()?;
    let day: u32 = digits[6..8].parse().ok()?;
    let hour: u32 = digits[8..10].parse().ok()?;
    let minute: u32 = digits[10..12].parse().ok()?;
    let second: u32 = digits[12..14].parse().ok()?;

    let nanos = match fraction {
        Some(f) if !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()) => {
            let f = &f[..f.len().min(9)];
            let scale = 10u32.pow(9 - f.len() as u32);
            f.parse::<u32>().ok()? * scale
        }
        Some(_) => return None,
        None => 0,
    };

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
    Some(Utc.from_utc_datetime(&NaiveDateTime::new(date, time)))
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),
}
