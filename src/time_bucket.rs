//! Time bucketing for streak days and weekly XP periods
//!
//! - Day buckets: "YYYY-MM-DD", used to persist streak activity dates
//! - Week buckets: "YYYY-Www" (ISO week), used as the weekly XP reset marker
//!
//! All bucketing is UTC. Streak and weekly-reset correctness depends on every
//! caller agreeing on a single day boundary, so no local-time variant exists.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Format a calendar date as its day bucket string.
pub fn day_bucket(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Parse a day bucket string back to a calendar date.
pub fn parse_day_bucket(bucket: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = bucket.split('-').collect();
    if parts.len() != 3 {
        return None;
    }
    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Compute the ISO-week bucket for an instant.
///
/// The week starts Monday 00:00 UTC. Note the ISO week-year can differ from
/// the calendar year around January 1st, which is why the bucket uses
/// `iso_week().year()` and not `year()`.
pub fn week_bucket(at: DateTime<Utc>) -> String {
    let iso = at.iso_week();
    format!("{:04}-W{:02}", iso.year(), iso.week())
}

/// Get the current day as a calendar date (UTC).
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
