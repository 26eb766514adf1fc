//! Application constants for the patient migrator
//!
//! This module contains the connection defaults, table and column names,
//! and normalization constants used throughout the migration pipeline.

// =============================================================================
// Connection Endpoints
// =============================================================================

/// Environment variable overriding the source (staging) connection string
pub const SOURCE_URL_ENV: &str = "SRC_DB_URL";

/// Environment variable overriding the target (normalized) connection string
pub const TARGET_URL_ENV: &str = "TGT_DB_URL";

/// Default source endpoint for local development
pub const DEFAULT_SOURCE_URL: &str = "sqlite://vista_dump.db";

/// Default target endpoint for local development
pub const DEFAULT_TARGET_URL: &str = "sqlite://millennium_core.db";

/// URL scheme prefixes accepted in connection strings
pub const SQLITE_URL_PREFIXES: &[&str] = &["sqlite://", "sqlite:"];

/// Special path for a private in-memory database
pub const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Table Names
// =============================================================================

/// Staging table holding unmodified legacy rows
pub const RAW_TABLE: &str = "PATIENT_RAW";

/// Normalized parent table
pub const PERSON_TABLE: &str = "PERSON";

/// Normalized child table
pub const CLINICAL_EVENT_TABLE: &str = "CLINICAL_EVENT";

// =============================================================================
// Normalization
// =============================================================================

/// First name substituted when a full name carries no comma
pub const UNKNOWN_FIRST_NAME: &str = "Unknown";

/// Separator between last and first name in legacy full names
pub const NAME_SEPARATOR: char = ',';

/// Separator between codes in the legacy diagnosis field
pub const DIAGNOSIS_DELIMITER: char = ',';

/// Date layouts tried after the compact and hyphenated forms, in order
pub mod date_formats {
    /// Compact legacy form, e.g. `19850613`
    pub const COMPACT: &str = "%Y%m%d";

    /// ISO-8601 calendar date, e.g. `1985-06-13`
    pub const HYPHENATED: &str = "%Y-%m-%d";

    /// Other calendar encodings accepted permissively
    pub const PERMISSIVE: &[&str] = &[
        "%Y/%m/%d",
        "%Y.%m.%d",
        "%m/%d/%Y",
        "%d-%b-%Y",
        "%d %b %Y",
        "%B %d, %Y",
        "%b %d, %Y",
    ];

    /// Datetime encodings whose date part is kept
    pub const DATETIME: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
    ];
}

// =============================================================================
// Reporting
// =============================================================================

/// Maximum number of unmatched LegacyIDs listed in a warning
pub const UNMATCHED_SAMPLE_LIMIT: usize = 10;

/// Rows inserted between progress bar updates
pub const PROGRESS_UPDATE_INTERVAL: u64 = 500;
