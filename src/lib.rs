//! Patient Migrator Library
//!
//! Migrates flat legacy patient records from a staging table into a
//! normalized schema: one `PERSON` row per legacy record with a fresh
//! surrogate key, and one `CLINICAL_EVENT` row per diagnosis code linked back
//! to that key.
//!
//! This library provides tools for:
//! - Extracting the raw staging table in full
//! - Splitting "LAST, FIRST" names and parsing ambiguous date encodings
//! - Replacing the person table and reading back the assigned PersonIDs
//! - Exploding comma-delimited diagnosis codes into child rows
//! - Joining child rows to the new keys by LegacyID and replacing the event table
//!
//! Malformed names and dates are absorbed row by row; only an unreachable or
//! unusable database aborts a run.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod transform;

// Re-export commonly used types
pub use config::{LoadMode, MigrationConfig};
pub use error::{MigrationError, Result};
pub use models::{ClinicalEventEntity, MigrationStats, PersonEntity, RawPatientRecord};
pub use pipeline::MigrationPipeline;
