//! Relational store access for the staging and normalized databases.
//!
//! Both endpoints are SQLite databases. Opening an endpoint checks it with a
//! cheap pragma so that a missing file, a bad path, or a file that is not a
//! database surfaces immediately as a connectivity failure rather than on the
//! first real query.

pub mod source;
pub mod target;

pub use self::source::SourceStore;
pub use self::target::TargetStore;

use crate::config::{ConnectionConfig, DatabaseLocation};
use crate::error::{MigrationError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

/// How an endpoint is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    fn flags(&self) -> OpenFlags {
        let base = OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        match self {
            AccessMode::ReadOnly => base | OpenFlags::SQLITE_OPEN_READ_ONLY,
            AccessMode::ReadWrite => {
                base | OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
            }
        }
    }
}

/// Open and check a connection for the given endpoint
pub fn open_connection(config: &ConnectionConfig, mode: AccessMode) -> Result<Connection> {
    let location = config.location()?;
    let connectivity = |source| MigrationError::Connectivity {
        role: config.role,
        url: config.url.clone(),
        env_var: config.role.env_var(),
        source,
    };

    let conn = match &location {
        DatabaseLocation::File(path) => Connection::open_with_flags(path, mode.flags()),
        DatabaseLocation::InMemory => Connection::open_in_memory_with_flags(mode.flags()),
    }
    .map_err(connectivity)?;

    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
        .map_err(connectivity)?;

    debug!("Opened {} database {:?} ({:?})", config.role, location, mode);
    Ok(conn)
}

/// Progress bar for a bulk insert into one table
pub(crate) fn create_load_progress_bar(total: usize, table: &str) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Loading {}", table));
    pb
}
