//! Equi-join of exploded diagnosis rows against the key mapping

use super::linker::KeyLinker;
use crate::models::{ClinicalEventEntity, DiagnosisRow};

/// Result of joining diagnosis rows to the current run's persons
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub events: Vec<ClinicalEventEntity>,
    /// Rows whose LegacyID had no person; kept out of the load
    pub unmatched: Vec<DiagnosisRow>,
}

impl JoinOutcome {
    /// Distinct unmatched LegacyIDs in ascending order
    pub fn unmatched_legacy_ids(&self) -> Vec<i64> {
        let mut ids: Vec<_> = self.unmatched.iter().map(|row| row.legacy_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Project each diagnosis row onto its PersonID, preserving row order
pub fn join_events(rows: Vec<DiagnosisRow>, linker: &KeyLinker) -> JoinOutcome {
    let mut outcome = JoinOutcome {
        events: Vec::with_capacity(rows.len()),
        unmatched: Vec::new(),
    };

    for row in rows {
        match linker.person_id(row.legacy_id) {
            Some(person_id) => outcome.events.push(ClinicalEventEntity {
                person_id,
                diagnosis_code: row.diagnosis_code,
                event_date: row.event_date,
            }),
            None => outcome.unmatched.push(row),
        }
    }

    outcome
}
