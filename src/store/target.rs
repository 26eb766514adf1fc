//! Loading of the normalized person and clinical-event tables.
//!
//! Each table is written under an explicit `LoadMode`. With `ReplaceAll` the
//! table is dropped and recreated, then filled inside a single table-local
//! transaction. The two tables are written independently of each other.

use super::{AccessMode, create_load_progress_bar, open_connection};
use crate::config::{ConnectionConfig, LoadMode};
use crate::constants::{CLINICAL_EVENT_TABLE, PERSON_TABLE, PROGRESS_UPDATE_INTERVAL};
use crate::error::{MigrationError, Result};
use crate::models::{ClinicalEventEntity, KeyLink, NewPerson, PersonEntity};
use rusqlite::{Connection, Statement, params};
use tracing::{debug, info};

const PERSON_DDL: &str = "CREATE TABLE PERSON (
    PersonID INTEGER PRIMARY KEY AUTOINCREMENT,
    FirstName TEXT NOT NULL,
    LastName TEXT NOT NULL,
    DOB DATE,
    LegacyID INTEGER NOT NULL UNIQUE
)";

const CLINICAL_EVENT_DDL: &str = "CREATE TABLE CLINICAL_EVENT (
    PersonID INTEGER NOT NULL REFERENCES PERSON (PersonID),
    DiagnosisCode TEXT NOT NULL,
    EventDate DATE
);
CREATE INDEX idx_clinical_event_person ON CLINICAL_EVENT (PersonID)";

/// Read-write handle on the normalized database
#[derive(Debug)]
pub struct TargetStore {
    conn: Connection,
}

impl TargetStore {
    /// Connect to the target database, creating the file if needed
    pub fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn = open_connection(config, AccessMode::ReadWrite)?;
        Ok(Self { conn })
    }

    /// Write the person table; the store assigns PersonIDs
    pub fn replace_persons(&mut self, persons: &[NewPerson], mode: LoadMode) -> Result<usize> {
        self.load_table(
            PERSON_TABLE,
            PERSON_DDL,
            "INSERT INTO PERSON (FirstName, LastName, DOB, LegacyID) VALUES (?1, ?2, ?3, ?4)",
            persons,
            mode,
            |stmt, person| {
                stmt.execute(params![
                    person.first_name,
                    person.last_name,
                    person.dob,
                    person.legacy_id
                ])
            },
        )
    }

    /// Write the clinical-event table
    pub fn replace_clinical_events(
        &mut self,
        events: &[ClinicalEventEntity],
        mode: LoadMode,
    ) -> Result<usize> {
        self.load_table(
            CLINICAL_EVENT_TABLE,
            CLINICAL_EVENT_DDL,
            "INSERT INTO CLINICAL_EVENT (PersonID, DiagnosisCode, EventDate) VALUES (?1, ?2, ?3)",
            events,
            mode,
            |stmt, event| {
                stmt.execute(params![
                    event.person_id,
                    event.diagnosis_code,
                    event.event_date
                ])
            },
        )
    }

    /// Project the person table to its PersonID/LegacyID pairs
    pub fn read_key_links(&self) -> Result<Vec<KeyLink>> {
        let context = || format!("reading key links from {}", PERSON_TABLE);
        let mut stmt = self
            .conn
            .prepare("SELECT PersonID, LegacyID FROM PERSON ORDER BY PersonID")
            .map_err(|e| MigrationError::query(context(), e))?;

        stmt.query_map([], |row| {
            Ok(KeyLink {
                person_id: row.get(0)?,
                legacy_id: row.get(1)?,
            })
        })
        .and_then(|rows| rows.collect())
        .map_err(|e| MigrationError::query(context(), e))
    }

    /// Every row of the person table in PersonID order
    pub fn read_persons(&self) -> Result<Vec<PersonEntity>> {
        let context = || format!("reading {}", PERSON_TABLE);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT PersonID, FirstName, LastName, DOB, LegacyID FROM PERSON ORDER BY PersonID",
            )
            .map_err(|e| MigrationError::query(context(), e))?;

        stmt.query_map([], |row| {
            Ok(PersonEntity {
                person_id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                dob: row.get(3)?,
                legacy_id: row.get(4)?,
            })
        })
        .and_then(|rows| rows.collect())
        .map_err(|e| MigrationError::query(context(), e))
    }

    /// Every row of the clinical-event table in insertion order
    pub fn read_clinical_events(&self) -> Result<Vec<ClinicalEventEntity>> {
        let context = || format!("reading {}", CLINICAL_EVENT_TABLE);
        let mut stmt = self
            .conn
            .prepare(
                "SELECT PersonID, DiagnosisCode, EventDate FROM CLINICAL_EVENT ORDER BY rowid",
            )
            .map_err(|e| MigrationError::query(context(), e))?;

        stmt.query_map([], |row| {
            Ok(ClinicalEventEntity {
                person_id: row.get(0)?,
                diagnosis_code: row.get(1)?,
                event_date: row.get(2)?,
            })
        })
        .and_then(|rows| rows.collect())
        .map_err(|e| MigrationError::query(context(), e))
    }

    /// Direct access to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn load_table<T, F>(
        &mut self,
        table: &str,
        ddl: &str,
        insert_sql: &str,
        rows: &[T],
        mode: LoadMode,
        bind: F,
    ) -> Result<usize>
    where
        F: Fn(&mut Statement<'_>, &T) -> rusqlite::Result<usize>,
    {
        let context = |action: &str| format!("{} {}", action, table);
        let tx = self
            .conn
            .transaction()
            .map_err(|e| MigrationError::query(context("starting load of"), e))?;

        match mode {
            LoadMode::ReplaceAll => {
                debug!("Replacing {} ({} rows)", table, rows.len());
                tx.execute_batch(&format!("DROP TABLE IF EXISTS {table};\n{ddl};"))
                    .map_err(|e| MigrationError::query(context("recreating"), e))?;
            }
        }

        let progress_bar = create_load_progress_bar(rows.len(), table);
        {
            let mut stmt = tx
                .prepare(insert_sql)
                .map_err(|e| MigrationError::query(context("preparing insert into"), e))?;

            for (i, row) in rows.iter().enumerate() {
                bind(&mut stmt, row)
                    .map_err(|e| MigrationError::query(context("inserting into"), e))?;

                if (i as u64 + 1) % PROGRESS_UPDATE_INTERVAL == 0 {
                    progress_bar.set_position(i as u64 + 1);
                }
            }
        }

        tx.commit()
            .map_err(|e| MigrationError::query(context("committing"), e))?;
        progress_bar.finish_and_clear();

        info!("Loaded {} rows into {} ({})", rows.len(), table, mode);
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EndpointRole;
    use chrono::NaiveDate;

    fn in_memory_target() -> TargetStore {
        TargetStore::connect(&ConnectionConfig::new(EndpointRole::Target, ":memory:")).unwrap()
    }

    fn person(legacy_id: i64, last: &str) -> NewPerson {
        NewPerson {
            first_name: "ANN".to_string(),
            last_name: last.to_string(),
            dob: NaiveDate::from_ymd_opt(1970, 5, 17),
            legacy_id,
        }
    }

    #[test]
    fn test_replace_persons_assigns_surrogate_keys() {
        let mut store = in_memory_target();
        let persons = vec![person(30, "A"), person(10, "B"), person(20, "C")];

        let loaded = store.replace_persons(&persons, LoadMode::ReplaceAll).unwrap();
        assert_eq!(loaded, 3);

        let rows = store.read_persons().unwrap();
        assert_eq!(rows.len(), 3);

        let mut ids: Vec<_> = rows.iter().map(|p| p.person_id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);

        // Insert order follows extraction order, not LegacyID order
        let legacy: Vec<_> = rows.iter().map(|p| p.legacy_id).collect();
        assert_eq!(legacy, vec![30, 10, 20]);
        assert_eq!(rows[0].dob, NaiveDate::from_ymd_opt(1970, 5, 17));
    }

    #[test]
    fn test_replace_persons_discards_previous_rows() {
        let mut store = in_memory_target();
        store
            .replace_persons(&[person(1, "OLD"), person(2, "OLD")], LoadMode::ReplaceAll)
            .unwrap();
        store
            .replace_persons(&[person(3, "NEW")], LoadMode::ReplaceAll)
            .unwrap();

        let rows = store.read_persons().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].last_name, "NEW");
        assert_eq!(rows[0].legacy_id, 3);
    }

    #[test]
    fn test_null_dob_round_trips_as_null() {
        let mut store = in_memory_target();
        let mut p = person(1, "X");
        p.dob = None;
        store.replace_persons(&[p], LoadMode::ReplaceAll).unwrap();

        assert_eq!(store.read_persons().unwrap()[0].dob, None);
    }

    #[test]
    fn test_read_key_links_matches_person_rows() {
        let mut store = in_memory_target();
        store
            .replace_persons(&[person(5, "A"), person(6, "B")], LoadMode::ReplaceAll)
            .unwrap();

        let persons = store.read_persons().unwrap();
        let links = store.read_key_links().unwrap();

        assert_eq!(links.len(), persons.len());
        for (link, p) in links.iter().zip(&persons) {
            assert_eq!(link.person_id, p.person_id);
            assert_eq!(link.legacy_id, p.legacy_id);
        }
    }

    #[test]
    fn test_duplicate_legacy_id_rejected_by_store() {
        let mut store = in_memory_target();
        let err = store
            .replace_persons(&[person(1, "A"), person(1, "B")], LoadMode::ReplaceAll)
            .unwrap_err();
        assert!(matches!(err, MigrationError::Query { .. }));
    }

    #[test]
    fn test_replace_clinical_events() {
        let mut store = in_memory_target();
        let visit = NaiveDate::from_ymd_opt(2024, 3, 1);
        let events = vec![
            ClinicalEventEntity {
                person_id: 1,
                diagnosis_code: "E11.9".to_string(),
                event_date: visit,
            },
            ClinicalEventEntity {
                person_id: 1,
                diagnosis_code: "I10".to_string(),
                event_date: visit,
            },
        ];

        store
            .replace_clinical_events(&events, LoadMode::ReplaceAll)
            .unwrap();
        store
            .replace_clinical_events(&events, LoadMode::ReplaceAll)
            .unwrap();

        assert_eq!(store.read_clinical_events().unwrap(), events);
    }

    #[test]
    fn test_empty_load_creates_empty_table() {
        let mut store = in_memory_target();
        assert_eq!(store.replace_persons(&[], LoadMode::ReplaceAll).unwrap(), 0);
        assert!(store.read_persons().unwrap().is_empty());
        assert!(store.read_key_links().unwrap().is_empty());
    }

    #[test]
    fn test_reading_before_any_load_is_query_error() {
        let store = in_memory_target();
        assert!(matches!(
            store.read_key_links().unwrap_err(),
            MigrationError::Query { .. }
        ));
    }
}
