//! Explodes the delimited diagnosis field into one row per code

use crate::constants::DIAGNOSIS_DELIMITER;
use crate::models::{DiagnosisRow, RawPatientRecord};

/// Trimmed, non-empty diagnosis codes in field order
pub fn diagnosis_codes(diagnosis_string: &str) -> impl Iterator<Item = &str> {
    diagnosis_string
        .split(DIAGNOSIS_DELIMITER)
        .map(str::trim)
        .filter(|code| !code.is_empty())
}

/// Number of blank tokens between delimiters, e.g. 1 for "E11.9,,I10"
///
/// A wholly blank field counts as zero tokens rather than one empty token.
pub fn empty_token_count(diagnosis_string: &str) -> usize {
    if diagnosis_string.trim().is_empty() {
        return 0;
    }
    diagnosis_string
        .split(DIAGNOSIS_DELIMITER)
        .filter(|token| token.trim().is_empty())
        .count()
}

/// One `DiagnosisRow` per code, carrying the record's raw_id and last visit
pub fn explode_diagnoses(record: &RawPatientRecord) -> Vec<DiagnosisRow> {
    diagnosis_codes(&record.diagnosis_string)
        .map(|code| DiagnosisRow {
            legacy_id: record.raw_id,
            diagnosis_code: code.to_string(),
            event_date: record.last_visit,
        })
        .collect()
}
