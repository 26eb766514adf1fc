//! Integration tests for the migration pipeline
//!
//! Tests the complete run against throwaway SQLite staging and target files.


use crate::config::MigrationConfig;
use rusqlite::{Connection, params};
use std::path::PathBuf;
use tempfile::TempDir;

/// One staging row as (raw_id, full_name, dob_string, diagnosis_string, last_visit)
pub type StagingRow<'a> = (i64, &'a str, &'a str, &'a str, &'a str);

/// Create a staging database holding the given rows
pub fn create_staging_db(temp_dir: &TempDir, rows: &[StagingRow<'_>]) -> PathBuf {
    let path = temp_dir.path().join("vista_dump.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE PATIENT_RAW (
            raw_id INTEGER PRIMARY KEY,
            full_name VARCHAR(255),
            dob_string VARCHAR(20),
            diagnosis_string VARCHAR(255),
            last_visit DATE
        );",
    )
    .unwrap();

    for row in rows {
        conn.execute(
            "INSERT INTO PATIENT_RAW (raw_id, full_name, dob_string, diagnosis_string, last_visit)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![row.0, row.1, row.2, row.3, row.4],
        )
        .unwrap();
    }

    path
}

/// Configuration pointing at a staging file and a fresh target file
pub fn config_for(temp_dir: &TempDir, staging: &std::path::Path) -> MigrationConfig {
    let target = temp_dir.path().join("millennium_core.db");
    MigrationConfig::default()
        .with_source(format!("sqlite://{}", staging.display()))
        .with_target(format!("sqlite://{}", target.display()))
}

/// A small, messy staging snapshot in the shape the legacy system produced
pub fn messy_snapshot() -> Vec<StagingRow<'static>> {
    vec![
        (1, "SMITH, JOHN", "19900101", "E11.9,I10", "2024-03-01"),
        (2, "DOE, JANE", "1985-06-13", "Z00.0", "2023-11-20"),
        (3, "PRINCE", "19770230", "J45.9,M54.5,I10", "2022-01-15"),
        (4, "NGUYEN,  AN ", "", "I10,,E11.9, ", "2021-07-04"),
        (10, "GARCIA, MARIA", "06/13/1985", "M54.5", "2024-02-29"),
    ]
}
