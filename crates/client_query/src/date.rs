//! Parsing of the legacy `/Date(...)/` sentinel strings found in query responses.
//!
//! Two shapes occur on the wire:
//! - `/Date(2016,10,2,21,50,52,0)/`: year, zero-based month, day, hour, minute, second and
//!   millisecond. Everything after the month is optional.
//! - `/Date(1478123452000)/`: milliseconds since the Unix epoch.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::Error;

#[cfg(test)]
#[path = "date_tests.rs"]
mod tests;

static SENTINEL_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/Date\((-?\d+(?:,-?\d+)*)\)/$").expect("sentinel date pattern is valid")
});

/// Converts a sentinel date string into a timestamp.
///
/// # Errors
///
/// Returns `Error::MalformedResponse` if the string is not a sentinel date or names a date
/// that does not exist.
pub fn parse_sentinel_date(value: &str) -> Result<NaiveDateTime, Error> {
    let malformed = || Error::MalformedResponse(format!("'{}' is not a valid date", value));

    let captures = SENTINEL_DATE.captures(value).ok_or_else(malformed)?;
    let parts = captures[1]
        .split(',')
        .map(str::parse::<i64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed())?;

    if let [millis] = parts.as_slice() {
        return DateTime::from_timestamp_millis(*millis)
            .map(|dt| dt.naive_utc())
            .ok_or_else(malformed);
    }

    if parts.len() > 7 {
        return Err(malformed());
    }

    let component = |index: usize, default: i64| parts.get(index).copied().unwrap_or(default);
    let to_u32 = |v: i64| u32::try_from(v).map_err(|_| malformed());

    let year = i32::try_from(component(0, 0)).map_err(|_| malformed())?;
    // Months are zero-based on the wire.
    let month = to_u32(component(1, 0) + 1)?;
    let day = to_u32(component(2, 1))?;
    let hour = to_u32(component(3, 0))?;
    let minute = to_u32(component(4, 0))?;
    let second = to_u32(component(5, 0))?;
    let millis = to_u32(component(6, 0))?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_milli_opt(hour, minute, second, millis))
        .ok_or_else(malformed)
}

/// Serde adapter for fields carrying a sentinel date.
pub fn deserialize_sentinel_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_sentinel_date(&raw).map_err(serde::de::Error::custom)
}
