//! Parsing of the operator supplied first reset boundary

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use super::app_config::ConfigError;

/// Parse a first boundary given either as RFC 3339 or as `DD-MM`.
///
/// `DD-MM` resolves to 00:00 UTC on the next occurrence of that day strictly
/// after `now` (this year, otherwise next year).
pub fn parse_first_boundary(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, ConfigError> {
    let raw = raw.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let invalid = |reason| ConfigError::InvalidBoundary(raw.to_string(), reason);

    let (day, month) = raw
        .split_once('-')
        .ok_or_else(|| invalid("expected RFC 3339 or DD-MM"))?;
    let day: u32 = day.parse().map_err(|_| invalid("day is not a number"))?;
    let month: u32 = month.parse().map_err(|_| invalid("month is not a number"))?;

    if !(1..=31).contains(&day) {
        return Err(invalid("day must be between 1 and 31"));
    }
    if !(1..=12).contains(&month) {
        return Err(invalid("month must be between 1 and 12"));
    }

    let year = now.year();
    [year, year + 1]
        .into_iter()
        .filter_map(|y| NaiveDate::from_ymd_opt(y, month, day))
        .filter_map(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .find(|candidate| *candidate > now)
        .ok_or_else(|| invalid("no such calendar date"))
}
