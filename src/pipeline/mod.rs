//! Migration engine.
//!
//! Runs the single linear pass of a migration: extract the staging rows,
//! normalize names and dates, replace the person table, read back the new
//! surrogate keys, explode diagnoses, join them to the new keys, and replace
//! the clinical-event table. There are no retries and no checkpoints; a
//! failure aborts the run where it stands.

pub mod join;
pub mod linker;

#[cfg(test)]
pub mod tests;

use self::join::{JoinOutcome, join_events};
use self::linker::KeyLinker;

use crate::config::MigrationConfig;
use crate::constants::{CLINICAL_EVENT_TABLE, PERSON_TABLE, RAW_TABLE, UNMATCHED_SAMPLE_LIMIT};
use crate::error::Result;
use crate::models::{DiagnosisRow, MigrationStats, NewPerson, RawPatientRecord};
use crate::store::{SourceStore, TargetStore};
use crate::transform::{empty_token_count, explode_diagnoses, is_sentinel_name, normalize_person};

use colored::*;
use std::time::Instant;
use tracing::{info, warn};

/// Main driver for one migration run
#[derive(Debug, Clone)]
pub struct MigrationPipeline {
    config: MigrationConfig,
}

impl MigrationPipeline {
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Main migration entry point
    pub fn run(&self) -> Result<MigrationStats> {
        let start_time = Instant::now();
        let mut stats = MigrationStats::default();

        println!("{}", "--- Starting Migration ---".bright_green().bold());
        println!("  {} {}", "Source:".bright_cyan(), self.config.source.url);
        println!("  {} {}", "Target:".bright_cyan(), self.config.target.url);
        println!(
            "  {} {}",
            "Load mode:".bright_cyan(),
            self.config.load_mode
        );

        // Step 1: Extract
        println!("\n{}", format!("Extracting {}...", RAW_TABLE).bright_yellow());
        let source = SourceStore::connect(&self.config.source)?;
        let records = source.extract_all()?;
        stats.raw_rows = records.len();
        println!(
            "  {} {} rows",
            "Extracted".bright_green(),
            records.len().to_string().bright_white().bold()
        );

        // Step 2: Normalize names and dates
        let persons = normalize_persons(&records, &mut stats);

        // Step 3: Load the parent table
        println!("\n{}", format!("Loading {}...", PERSON_TABLE).bright_yellow());
        let mut target = TargetStore::connect(&self.config.target)?;
        stats.persons_loaded = target.replace_persons(&persons, self.config.load_mode)?;
        println!(
            "  {} {} rows into {}",
            "Loaded".bright_green(),
            stats.persons_loaded.to_string().bright_white().bold(),
            PERSON_TABLE
        );

        // Step 4: Resolve the new surrogate keys
        let linker = KeyLinker::link(&target, stats.persons_loaded)?;
        println!(
            "  {} {} PersonIDs to LegacyIDs",
            "Linked".bright_green(),
            linker.len().to_string().bright_white().bold()
        );

        // Step 5: Explode diagnoses and join to the new keys
        println!(
            "\n{}",
            format!("Loading {}...", CLINICAL_EVENT_TABLE).bright_yellow()
        );
        let diagnosis_rows = explode_all(&records, &mut stats);
        println!(
            "  {} {} diagnosis rows",
            "Exploded".bright_green(),
            stats.diagnosis_rows.to_string().bright_white().bold()
        );
        let outcome = join_events(diagnosis_rows, &linker);
        stats.unmatched_diagnosis_rows = outcome.unmatched.len();
        let join_counts = join_counts_line(&outcome);
        if outcome.unmatched.is_empty() {
            println!("  {} {}", "Joined".bright_green(), join_counts);
        } else {
            println!("  {} {}", "Joined".bright_green(), join_counts.bright_red());
        }
        report_unmatched(&outcome);

        // Step 6: Load the child table
        stats.clinical_events_loaded =
            target.replace_clinical_events(&outcome.events, self.config.load_mode)?;
        println!(
            "  {} {} rows into {}",
            "Loaded".bright_green(),
            stats.clinical_events_loaded.to_string().bright_white().bold(),
            CLINICAL_EVENT_TABLE
        );

        stats.processing_time_ms = start_time.elapsed().as_millis();
        print_summary(&stats);

        Ok(stats)
    }
}

/// Normalize every raw record into a person row, counting absorbed defects
pub fn normalize_persons(records: &[RawPatientRecord], stats: &mut MigrationStats) -> Vec<NewPerson> {
    records
        .iter()
        .map(|record| {
            let person = normalize_person(record);

            if is_sentinel_name(&record.full_name) {
                stats.names_defaulted += 1;
            }
            if record.dob_string.trim().is_empty() {
                stats.dobs_blank += 1;
            } else if person.dob.is_none() {
                stats.dobs_unparsed += 1;
            }
            if record.last_visit.is_none() {
                stats.visit_dates_missing += 1;
            }

            person
        })
        .collect()
}

/// Explode every record's diagnosis field, counting discarded blank tokens
pub fn explode_all(records: &[RawPatientRecord], stats: &mut MigrationStats) -> Vec<DiagnosisRow> {
    let rows: Vec<_> = records.iter().flat_map(explode_diagnoses).collect();

    stats.empty_diagnosis_tokens = records
        .iter()
        .map(|record| empty_token_count(&record.diagnosis_string))
        .sum();
    stats.diagnosis_rows = rows.len();

    info!(
        "Exploded {} diagnosis rows from {} records",
        rows.len(),
        records.len()
    );
    rows
}

/// Stage line for the join, e.g. "8 rows to PersonIDs, 1 unmatched"
fn join_counts_line(outcome: &JoinOutcome) -> String {
    format!(
        "{} rows to PersonIDs, {} unmatched",
        outcome.events.len(),
        outcome.unmatched.len()
    )
}

/// Surface diagnosis rows that could not be linked to a person
fn report_unmatched(outcome: &JoinOutcome) {
    if outcome.unmatched.is_empty() {
        return;
    }

    let ids = outcome.unmatched_legacy_ids();
    let sample: Vec<String> = ids
        .iter()
        .take(UNMATCHED_SAMPLE_LIMIT)
        .map(|id| id.to_string())
        .collect();
    let more = ids.len().saturating_sub(sample.len());

    warn!(
        "{} diagnosis rows for {} LegacyIDs have no matching person and were not loaded: {}{}",
        outcome.unmatched.len(),
        ids.len(),
        sample.join(", "),
        if more > 0 {
            format!(" (+{} more)", more)
        } else {
            String::new()
        }
    );
}

fn print_summary(stats: &MigrationStats) {
    println!("\n{}", "Migration Summary".bright_green().bold());
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Raw rows:".bright_cyan(),
        stats.raw_rows.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Persons loaded:".bright_cyan(),
        stats.persons_loaded.to_string().bright_white().bold()
    );
    println!(
        "  {} {}",
        "Clinical events loaded:".bright_cyan(),
        stats.clinical_events_loaded.to_string().bright_white().bold()
    );

    if stats.names_defaulted > 0 {
        println!(
            "  {} {}",
            "Names without comma:".bright_yellow(),
            stats.names_defaulted.to_string().bright_yellow()
        );
    }
    if stats.dobs_unparsed > 0 || stats.dobs_blank > 0 {
        println!(
            "  {} {} unparseable, {} blank",
            "Null DOBs:".bright_yellow(),
            stats.dobs_unparsed.to_string().bright_yellow(),
            stats.dobs_blank
        );
    }
    if stats.visit_dates_missing > 0 {
        println!(
            "  {} {}",
            "Missing visit dates:".bright_yellow(),
            stats.visit_dates_missing.to_string().bright_yellow()
        );
    }
    if stats.empty_diagnosis_tokens > 0 {
        println!(
            "  {} {}",
            "Empty diagnosis tokens:".bright_yellow(),
            stats.empty_diagnosis_tokens.to_string().bright_yellow()
        );
    }
    if stats.unmatched_diagnosis_rows > 0 {
        println!(
            "  {} {}",
            "Unmatched diagnosis rows:".bright_red(),
            stats.unmatched_diagnosis_rows.to_string().bright_red().bold()
        );
    }

    println!("{}", "--- Migration Complete ---".bright_green().bold());
}
