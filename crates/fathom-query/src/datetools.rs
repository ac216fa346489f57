//! Date resolutions and range-endpoint encoding.
//!
//! Range endpoints on date-configured fields are encoded as fixed-width
//! digit strings (`yyyyMMddHHmmssSSS`, truncated to the resolution) so that
//! lexicographic order matches chronological order.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Granularity at which a timestamp is truncated and encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// `yyyy`
    Year,
    /// `yyyyMM`
    Month,
    /// `yyyyMMdd`
    Day,
    /// `yyyyMMddHH`
    Hour,
    /// `yyyyMMddHHmm`
    Minute,
    /// `yyyyMMddHHmmss`
    Second,
    /// `yyyyMMddHHmmssSSS`
    Millisecond,
}

impl Resolution {
    /// The chrono format string for this resolution.
    fn format(self) -> &'static str {
        match self {
            Self::Year => "%Y",
            Self::Month => "%Y%m",
            Self::Day => "%Y%m%d",
            Self::Hour => "%Y%m%d%H",
            Self::Minute => "%Y%m%d%H%M",
            Self::Second => "%Y%m%d%H%M%S",
            Self::Millisecond => "%Y%m%d%H%M%S%3f",
        }
    }
}

/// Encodes a timestamp at the given resolution.
///
/// Components finer than the resolution are discarded, so two timestamps
/// within the same period encode identically.
pub fn date_to_string(timestamp: NaiveDateTime, resolution: Resolution) -> String {
    timestamp.format(resolution.format()).to_string()
}

/// Decodes a string produced by [`date_to_string`] at the same resolution.
///
/// Discarded components come back as their minimum value.
pub fn string_to_date(encoded: &str, resolution: Resolution) -> Option<NaiveDateTime> {
    let mut full = String::from(encoded);
    match resolution {
        Resolution::Year => full.push_str("0101"),
        Resolution::Month => full.push_str("01"),
        _ => {}
    }
    // pad the time components down to milliseconds
    while full.len() < 17 {
        full.push('0');
    }
    NaiveDateTime::parse_from_str(&full, "%Y%m%d%H%M%S%3f").ok()
}

/// Parses a short-form date: `M/D/YYYY` or `YYYY-MM-DD`.
pub fn parse_short_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%m/%d/%Y")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
}

/// The first instant of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or_default()
}

/// The last representable millisecond of `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999).unwrap_or_default()
}
