use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Errors raised while parsing a `from`/`to` query pair
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateRangeError {
    /// A bound is not a `YYYYMMDD` calendar date
    #[error("Invalid date format: {0:?}, expected YYYYMMDD")]
    InvalidFormat(String),

    /// `from` is after `to`
    #[error("Invalid date range: from {from} is after to {to}")]
    InvalidRange { from: String, to: String },
}

/// A validated, inclusive range of calendar days.
///
/// Both bounds are midnight of their day; the repository extends `to`
/// through the end of that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl DateRange {
    /// Parse two `YYYYMMDD` strings. `from == to` is a single day.
    pub fn parse(from: &str, to: &str) -> Result<Self, DateRangeError> {
        let start = parse_day(from)?;
        let end = parse_day(to)?;

        // Fixed width and zero padded, so string order is date order
        if from > to {
            return Err(DateRangeError::InvalidRange {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        Ok(Self { from: start, to: end })
    }
}

fn parse_day(raw: &str) -> Result<NaiveDateTime, DateRangeError> {
    let invalid = || DateRangeError::InvalidFormat(raw.to_string());

    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let year: i32 = raw[0..4].parse().map_err(|_| invalid())?;
    let month: u32 = raw[4..6].parse().map_err(|_| invalid())?;
    let day: u32 = raw[6..8].parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(invalid)
}
