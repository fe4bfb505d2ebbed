//! Date parsing and display helpers shared by validation and the public read model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

const FALLBACK: &str = "N/A";

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_flexible(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Format a date with a chrono format string, or return the fallback.
pub fn format_date(date: Option<&DateTime<Utc>>, fmt: &str, fallback: &str) -> String {
    match date {
        Some(date) => date.format(fmt).to_string(),
        None => fallback.to_string(),
    }
}

/// "Jan 2023"
pub fn format_month_year(date: Option<&DateTime<Utc>>) -> String {
    format_date(date, "%b %Y", FALLBACK)
}

/// "2023"
pub fn format_year(date: Option<&DateTime<Utc>>) -> String {
    format_date(date, "%Y", FALLBACK)
}

/// "Jan 2021 – Mar 2023", or "Jan 2021 – Present" when there is no end date.
pub fn format_date_range(start: Option<&DateTime<Utc>>, end: Option<&DateTime<Utc>>) -> String {
    format_range(start, end, "%b %Y")
}

/// Date range with a custom format for both ends.
pub fn format_range(start: Option<&DateTime<Utc>>, end: Option<&DateTime<Utc>>, fmt: &str) -> String {
    let start = format_date(start, fmt, FALLBACK);
    let end = match end {
        Some(end) => format_date(Some(end), fmt, FALLBACK),
        None => "Present".to_string(),
    };
    format!("{start} – {end}")
}

fn parse_or_error<E: serde::de::Error>(raw: &str) -> Result<DateTime<Utc>, E> {
    parse_flexible(raw).ok_or_else(|| E::custom(format!("invalid date: {raw}")))
}

/// Serde helper for `Option<DateTime<Utc>>` fields that accept either format.
pub mod flexible {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_or_error(&raw).map(Some),
            None => Ok(None),
        }
    }
}

/// Serde helper for patch fields: absent -> `None`, `null` -> `Some(None)`.
pub mod nullable_flexible {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse_or_error(&raw).map(|d| Some(Some(d))),
            None => Ok(Some(None)),
        }
    }
}
