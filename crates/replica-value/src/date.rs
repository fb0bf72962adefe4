//! Date objects
//!
//! A date is a single time value: milliseconds since the Unix epoch, with NaN
//! standing for an invalid date.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::object::JsObject;

/// Largest representable time value (±100,000,000 days)
const MAX_TIME_MS: f64 = 8.64e15;

/// A JavaScript Date
#[derive(Debug)]
pub struct JsDate {
    /// The object portion (prototype, user properties)
    pub object: Arc<JsObject>,
    time: RwLock<f64>,
}

impl JsDate {
    /// Create a date holding `time` (clipped like `TimeClip`)
    pub fn new(object: Arc<JsObject>, time: f64) -> Self {
        Self {
            object,
            time: RwLock::new(time_clip(time)),
        }
    }

    /// `getTime()`
    pub fn time_value(&self) -> f64 {
        *self.time.read()
    }

    /// `setTime()`
    pub fn set_time(&self, time: f64) {
        *self.time.write() = time_clip(time);
    }

    /// Whether this is an invalid date
    pub fn is_invalid(&self) -> bool {
        self.time_value().is_nan()
    }

    /// `toISOString()`, `None` for invalid dates
    pub fn to_iso_string(&self) -> Option<String> {
        let time = self.time_value();
        if time.is_nan() {
            return None;
        }
        DateTime::<Utc>::from_timestamp_millis(time as i64)
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// `TimeClip`: out-of-range and non-finite times become NaN, -0 becomes +0
pub fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > MAX_TIME_MS {
        return f64::NAN;
    }
    time.trunc() + 0.0
}

/// Parse a date string into a time value.
///
/// Accepts RFC 3339 timestamps, offset-less date-times (read as UTC) and
/// date-only forms (UTC midnight, as `Date.parse` treats them).
pub fn parse_date(input: &str) -> Option<f64> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.timestamp_millis() as f64);
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(naive.and_utc().timestamp_millis() as f64);
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis() as f64)
}
