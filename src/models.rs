//! Core data structures for the migration.
//!
//! Defines the raw staging row, the normalized person and clinical-event
//! entities, the intermediate tuples that flow between stages, and the
//! per-run statistics.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unmodified legacy row from the staging table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPatientRecord {
    pub raw_id: i64,
    /// Expected in "LAST, FIRST" shape
    pub full_name: String,
    /// Either `YYYYMMDD` or `YYYY-MM-DD`, sometimes neither
    pub dob_string: String,
    /// Comma-delimited diagnosis code list
    pub diagnosis_string: String,
    pub last_visit: Option<NaiveDate>,
}

/// First/last name pair produced by the name normalizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
}

/// Normalized person row before the target store assigns a PersonID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    pub legacy_id: i64,
}

/// Row of the target person table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonEntity {
    /// Surrogate key, reassigned on every run
    pub person_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub dob: Option<NaiveDate>,
    /// Durable join key back to `RawPatientRecord::raw_id`
    pub legacy_id: i64,
}

/// PersonID/LegacyID projection read back after the person load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyLink {
    pub person_id: i64,
    pub legacy_id: i64,
}

/// One diagnosis code split out of a raw record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosisRow {
    pub legacy_id: i64,
    pub diagnosis_code: String,
    pub event_date: Option<NaiveDate>,
}

/// Row of the target clinical-event table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalEventEntity {
    pub person_id: i64,
    pub diagnosis_code: String,
    pub event_date: Option<NaiveDate>,
}

/// Migration statistics
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationStats {
    pub raw_rows: usize,
    pub persons_loaded: usize,
    /// Names without a comma, given the sentinel first name
    pub names_defaulted: usize,
    /// Non-blank DOB strings that did not parse
    pub dobs_unparsed: usize,
    pub dobs_blank: usize,
    /// Raw rows whose last visit could not be read as a date
    pub visit_dates_missing: usize,
    pub diagnosis_rows: usize,
    /// Blank tokens dropped while exploding diagnosis strings
    pub empty_diagnosis_tokens: usize,
    pub clinical_events_loaded: usize,
    /// Diagnosis rows whose LegacyID had no person after the reload
    pub unmatched_diagnosis_rows: usize,
    pub processing_time_ms: u128,
}

impl MigrationStats {
    /// Whether any row-level issue was absorbed during the run
    pub fn has_data_quality_issues(&self) -> bool {
        self.names_defaulted > 0
            || self.dobs_unparsed > 0
            || self.empty_diagnosis_tokens > 0
            || self.unmatched_diagnosis_rows > 0
    }
}
