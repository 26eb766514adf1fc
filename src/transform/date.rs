//! Best-effort parsing of legacy date-of-birth strings.
//!
//! The legacy system wrote dates either compact (`YYYYMMDD`) or hyphenated
//! (`YYYY-MM-DD`). A handful of other hand-keyed layouts also show up, so
//! those are accepted too. Anything that cannot be read as a real calendar
//! date becomes `None`; a bad date never stops the migration.

use crate::constants::date_formats;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static COMPACT_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("compact date pattern is valid")
});

/// Parse a legacy date string into a calendar date
pub fn parse_dob(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(caps) = COMPACT_DATE.captures(value) {
        // Eight digits are never anything but the compact form
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, date_formats::HYPHENATED) {
        return Some(date);
    }

    parse_permissive(value)
}

fn parse_permissive(value: &str) -> Option<NaiveDate> {
    if let Some(date) = date_formats::PERMISSIVE
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
    {
        return Some(date);
    }

    if let Some(datetime) = date_formats::DATETIME
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(datetime.date());
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|datetime| datetime.date_naive())
}
