//! Extraction of raw rows from the staging table

use super::{AccessMode, open_connection};
use crate::config::ConnectionConfig;
use crate::constants::{RAW_TABLE, date_formats};
use crate::error::{MigrationError, Result};
use crate::models::RawPatientRecord;
use crate::transform::parse_dob;
use chrono::NaiveDate;
use rusqlite::Connection;
use rusqlite::types::ValueRef;
use tracing::debug;

/// Read-only handle on the staging database
#[derive(Debug)]
pub struct SourceStore {
    conn: Connection,
}

impl SourceStore {
    /// Connect to the staging database without creating or modifying it
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn = open_connection(config, AccessMode::ReadOnly)?;
        Ok(Self { conn })
    }

    /// Read the entire staging table in raw_id order
    pub fn extract_all(&self) -> Result<Vec<RawPatientRecord>> {
        let sql = format!(
            "SELECT raw_id, full_name, dob_string, diagnosis_string, last_visit FROM {} ORDER BY raw_id",
            RAW_TABLE
        );
        let context = || format!("reading {}", RAW_TABLE);

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| MigrationError::query(context(), e))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawPatientRecord {
                    raw_id: row.get(0)?,
                    full_name: text_value(row.get_ref(1)?),
                    dob_string: text_value(row.get_ref(2)?),
                    diagnosis_string: text_value(row.get_ref(3)?),
                    last_visit: visit_date(row.get_ref(4)?),
                })
            })
            .map_err(|e| MigrationError::query(context(), e))?;

        let records = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| MigrationError::query(context(), e))?;

        debug!("Extracted {} rows from {}", records.len(), RAW_TABLE);
        Ok(records)
    }
}

/// Render a loosely typed legacy column as text
///
/// Bulk loaders sometimes store all-digit values such as compact dates as
/// integers, so numbers are rendered back to their text form. NULL becomes an
/// empty string.
fn text_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Decode the last-visit column
///
/// ISO dates (with or without a trailing time) take the fast path. Any other
/// value, including integers a bulk loader made of compact dates, goes
/// through the same tolerant parser as the date of birth.
fn visit_date(value: ValueRef<'_>) -> Option<NaiveDate> {
    let text = text_value(value);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(date) = trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, date_formats::HYPHENATED).ok())
    {
        return Some(date);
    }

    let date = parse_dob(trimmed);
    if date.is_none() {
        debug!("Unreadable last_visit '{}'; treating as missing", trimmed);
    }
    date
}
