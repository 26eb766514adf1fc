//! Configuration management and validation.
//!
//! Provides the source/target connection descriptors and the load policy
//! that are passed explicitly into each pipeline stage.

use crate::constants::{
    DEFAULT_SOURCE_URL, DEFAULT_TARGET_URL, IN_MEMORY_PATH, SOURCE_URL_ENV, SQLITE_URL_PREFIXES,
    TARGET_URL_ENV,
};
use crate::error::{MigrationError, Result};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Which side of the migration a connection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointRole {
    Source,
    Target,
}

impl EndpointRole {
    /// Environment variable that overrides this endpoint
    pub fn env_var(&self) -> &'static str {
        match self {
            EndpointRole::Source => SOURCE_URL_ENV,
            EndpointRole::Target => TARGET_URL_ENV,
        }
    }

    /// Connection string used when the environment does not provide one
    pub fn default_url(&self) -> &'static str {
        match self {
            EndpointRole::Source => DEFAULT_SOURCE_URL,
            EndpointRole::Target => DEFAULT_TARGET_URL,
        }
    }

    /// Database file stem used in remediation examples
    pub fn default_db_stem(&self) -> &'static str {
        match self {
            EndpointRole::Source => "vista_dump",
            EndpointRole::Target => "millennium_core",
        }
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointRole::Source => write!(f, "source"),
            EndpointRole::Target => write!(f, "target"),
        }
    }
}

/// Where a connection string points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// A database file on disk
    File(PathBuf),
    /// A private in-memory database (only useful for the target in tests)
    InMemory,
}

/// Connection descriptor for one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub role: EndpointRole,
    pub url: String,
}

impl ConnectionConfig {
    pub fn new(role: EndpointRole, url: impl Into<String>) -> Self {
        Self {
            role,
            url: url.into(),
        }
    }

    /// Resolve the connection string into a database location
    ///
    /// Accepts `sqlite://<path>`, `sqlite:<path>`, a bare path, or `:memory:`.
    pub fn location(&self) -> Result<DatabaseLocation> {
        let trimmed = self.url.trim();
        let path = SQLITE_URL_PREFIXES
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed);

        if path.is_empty() {
            return Err(MigrationError::Configuration {
                message: format!(
                    "{} connection string '{}' does not name a database (set {})",
                    self.role,
                    self.url,
                    self.role.env_var()
                ),
            });
        }

        if path == IN_MEMORY_PATH {
            return Ok(DatabaseLocation::InMemory);
        }

        Ok(DatabaseLocation::File(PathBuf::from(path)))
    }
}

/// How a loader treats rows already present in a target table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadMode {
    /// Discard every existing row and write the current run's output
    #[default]
    ReplaceAll,
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadMode::ReplaceAll => write!(f, "ReplaceAll"),
        }
    }
}

/// Global configuration for a migration run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    /// Staging store holding the raw legacy table
    pub source: ConnectionConfig,

    /// Normalized store receiving the person and clinical-event tables
    pub target: ConnectionConfig,

    /// Load policy applied to both target tables
    pub load_mode: LoadMode,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            source: ConnectionConfig::new(EndpointRole::Source, DEFAULT_SOURCE_URL),
            target: ConnectionConfig::new(EndpointRole::Target, DEFAULT_TARGET_URL),
            load_mode: LoadMode::ReplaceAll,
        }
    }
}

impl MigrationConfig {
    /// Build configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve = |role: EndpointRole| {
            let url = lookup(role.env_var())
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| role.default_url().to_string());
            debug!("{} endpoint resolved to {}", role, url);
            ConnectionConfig::new(role, url)
        };

        Self {
            source: resolve(EndpointRole::Source),
            target: resolve(EndpointRole::Target),
            load_mode: LoadMode::default(),
        }
    }

    /// Use a custom source connection string
    pub fn with_source(mut self, url: impl Into<String>) -> Self {
        self.source = ConnectionConfig::new(EndpointRole::Source, url);
        self
    }

    /// Use a custom target connection string
    pub fn with_target(mut self, url: impl Into<String>) -> Self {
        self.target = ConnectionConfig::new(EndpointRole::Target, url);
        self
    }

    /// Use a specific load policy
    pub fn with_load_mode(mut self, load_mode: LoadMode) -> Self {
        self.load_mode = load_mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = MigrationConfig::from_lookup(|_| None);

        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
        assert_eq!(config.target.url, DEFAULT_TARGET_URL);
        assert_eq!(config.source.role, EndpointRole::Source);
        assert_eq!(config.target.role, EndpointRole::Target);
        assert_eq!(config.load_mode, LoadMode::ReplaceAll);
        assert_eq!(config, MigrationConfig::default());
    }

    #[test]
    fn test_environment_overrides_each_endpoint() {
        let env: HashMap<&str, &str> = [
            ("SRC_DB_URL", "sqlite:///data/staging.db"),
            ("TGT_DB_URL", "/data/core.db"),
        ]
        .into_iter()
        .collect();

        let config = MigrationConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.source.url, "sqlite:///data/staging.db");
        assert_eq!(config.target.url, "/data/core.db");
    }

    #[test]
    fn test_blank_environment_value_falls_back_to_default() {
        let config = MigrationConfig::from_lookup(|key| {
            (key == "SRC_DB_URL").then(|| "   ".to_string())
        });
        assert_eq!(config.source.url, DEFAULT_SOURCE_URL);
    }

    #[test]
    fn test_location_parsing() {
        let cases = [
            ("sqlite://vista_dump.db", DatabaseLocation::File("vista_dump.db".into())),
            ("sqlite:///tmp/x.db", DatabaseLocation::File("/tmp/x.db".into())),
            ("sqlite:relative.db", DatabaseLocation::File("relative.db".into())),
            ("/var/lib/core.db", DatabaseLocation::File("/var/lib/core.db".into())),
            (":memory:", DatabaseLocation::InMemory),
            ("sqlite://:memory:", DatabaseLocation::InMemory),
        ];

        for (url, expected) in cases {
            let conn = ConnectionConfig::new(EndpointRole::Target, url);
            assert_eq!(conn.location().unwrap(), expected, "url: {}", url);
        }
    }

    #[test]
    fn test_empty_location_is_configuration_error() {
        let conn = ConnectionConfig::new(EndpointRole::Source, "sqlite://");
        let err = conn.location().unwrap_err();
        assert!(matches!(err, MigrationError::Configuration { .. }));
        assert!(err.to_string().contains("SRC_DB_URL"));
    }

    #[test]
    fn test_builders() {
        let config = MigrationConfig::default()
            .with_source("a.db")
            .with_target("b.db")
            .with_load_mode(LoadMode::ReplaceAll);

        assert_eq!(config.source, ConnectionConfig::new(EndpointRole::Source, "a.db"));
        assert_eq!(config.target, ConnectionConfig::new(EndpointRole::Target, "b.db"));
    }
}
