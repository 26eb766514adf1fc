//! Error handling for migration runs.
//!
//! Only infrastructure-level failures are represented here. Row-level
//! data-quality problems (malformed names, dates, unmatched diagnosis rows)
//! are absorbed by the transforms and counted in the run statistics.

use crate::config::EndpointRole;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Could not connect to the {role} database at '{url}'")]
    Connectivity {
        role: EndpointRole,
        url: String,
        env_var: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error while {operation}")]
    Query {
        operation: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error(
        "Stale key mapping: loaded {expected} persons but read back {found} PersonID/LegacyID rows"
    )]
    StaleKeyMapping { expected: usize, found: usize },

    #[error("LegacyID {legacy_id} appears more than once in the person table")]
    DuplicateLegacyId { legacy_id: i64 },
}

impl MigrationError {
    /// Wrap a database error with the operation that was running
    pub fn query(operation: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Query {
            operation: operation.into(),
            source,
        }
    }

    /// Whether the failure is an unreachable or unusable endpoint
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }

    /// Operator guidance for recovering from this failure, if any
    pub fn remediation(&self) -> Option<String> {
        match self {
            Self::Connectivity { role, env_var, .. } => Some(format!(
                "Check that the {} database exists and is readable, or set `{}` to its location, for example:\n    {}=sqlite:///path/to/{}.db",
                role,
                env_var,
                env_var,
                role.default_db_stem()
            )),
            Self::StaleKeyMapping { .. } => Some(
                "Another process may be writing to the target database; serialize migration runs and retry."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MigrationError>;
