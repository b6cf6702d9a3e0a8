//! Serde helpers for the client supplied `record_time` field.
//!
//! Clients send either a naive ISO 8601 timestamp (`2024-07-18T08:30:00`) or
//! an RFC 3339 timestamp with an offset. Offsets are normalised to UTC and
//! dropped, so every stored `record_time` is a wall-clock value in UTC.

use chrono::{DateTime, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serializer};

/// Format used when writing a `record_time` back out
pub const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Fixed width format used as the SQLite sort key; lexical order equals time order
pub const STORAGE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse a timestamp in any of the accepted input shapes
pub fn parse(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(input) {
        return Some(with_offset.naive_utc());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
}

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(OUTPUT_FORMAT))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid record time: {}", raw)))
}
