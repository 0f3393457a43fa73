/// Shared data types for the climate API.
///
/// Dates travel through the service as `YYYY-MM-DD` strings (that is how
/// the dataset stores them and how they appear in responses). Parsing into
/// `NaiveDate` happens only where date arithmetic or validation is needed.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage and wire format for every date in the dataset.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of a well-formed `YYYY-MM-DD` string.
const DATE_LEN: usize = 10;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Date → precipitation for the trailing observation window.
///
/// A `BTreeMap` keeps keys in ascending date order in the JSON output.
pub type PrecipitationByDate = BTreeMap<String, Option<f64>>;

/// One temperature observation, serialized as `["YYYY-MM-DD", 77.0]`.
pub type TemperatureObservation = (String, f64);

/// MIN/AVG/MAX of `tobs` over a filtered row set.
///
/// All three fields are `None` when no rows matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    #[serde(rename = "TMIN")]
    pub min: Option<f64>,
    #[serde(rename = "TAVG")]
    pub avg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub max: Option<f64>,
}

impl TemperatureStats {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}

// ---------------------------------------------------------------------------
// Date handling
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` range of dates covered by the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Window ending at `last_date` and reaching back `lookback_days`
    /// plain days (no calendar-year awareness: leap days are not special).
    ///
    /// `None` when `lookback_days` is negative or reaches past the earliest
    /// representable date.
    pub fn ending_at(last_date: NaiveDate, lookback_days: i64) -> Option<Self> {
        let days = u64::try_from(lookback_days).ok()?;
        let start = last_date.checked_sub_days(Days::new(days))?;
        Some(DateWindow { start, end: last_date })
    }

    /// Start of the window in storage format, for `date >= ?` filters.
    pub fn start_key(&self) -> String {
        format_date(self.start)
    }

    #[cfg(test)]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Parses a date that must be exactly `YYYY-MM-DD`.
///
/// chrono alone accepts unpadded fields such as `2017-8-1`; those would
/// compare incorrectly against the zero-padded strings in the store, so the
/// shape is checked byte by byte first.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() != DATE_LEN {
        return None;
    }
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
