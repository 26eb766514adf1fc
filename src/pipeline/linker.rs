//! Resolution of freshly assigned PersonIDs back to LegacyIDs.
//!
//! PersonIDs only exist once the person load has committed, so the mapping
//! is read back from the target store rather than predicted. The mapping must
//! describe exactly the rows that were just loaded: one link per person and
//! no LegacyID twice. Anything else means the table changed underneath the
//! run, and linking child rows against it would attach events to the wrong
//! people.

use crate::error::{MigrationError, Result};
use crate::models::KeyLink;
use crate::store::TargetStore;
use std::collections::HashMap;
use tracing::debug;

/// LegacyID → PersonID lookup for the current run
#[derive(Debug, Clone, Default)]
pub struct KeyLinker {
    by_legacy_id: HashMap<i64, i64>,
}

impl KeyLinker {
    /// Read the person table back and build the mapping
    ///
    /// `expected` is the number of persons the loader reported writing.
    pub fn link(store: &TargetStore, expected: usize) -> Result<Self> {
        let links = store.read_key_links()?;
        Self::from_links(links, expected)
    }

    /// Build the mapping from already-read links
    pub fn from_links(links: Vec<KeyLink>, expected: usize) -> Result<Self> {
        if links.len() != expected {
            return Err(MigrationError::StaleKeyMapping {
                expected,
                found: links.len(),
            });
        }

        let mut by_legacy_id = HashMap::with_capacity(links.len());
        for link in links {
            if by_legacy_id.insert(link.legacy_id, link.person_id).is_some() {
                return Err(MigrationError::DuplicateLegacyId {
                    legacy_id: link.legacy_id,
                });
            }
        }

        debug!("Linked {} PersonIDs to LegacyIDs", by_legacy_id.len());
        Ok(Self { by_legacy_id })
    }

    /// PersonID assigned to a LegacyID in this run
    pub fn person_id(&self, legacy_id: i64) -> Option<i64> {
        self.by_legacy_id.get(&legacy_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_legacy_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_legacy_id.is_empty()
    }
}
