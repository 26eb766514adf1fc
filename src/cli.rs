//! Command-line interface components.

use crate::config::MigrationConfig;
use crate::constants::{SOURCE_URL_ENV, TARGET_URL_ENV};
use crate::models::MigrationStats;
use crate::pipeline::MigrationPipeline;
use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "patient_migrator")]
#[command(about = "Migrate legacy PATIENT_RAW rows into the normalized PERSON and CLINICAL_EVENT tables")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = format!(
    "Connection strings are read from {SOURCE_URL_ENV} and {TARGET_URL_ENV}.\n\
     Log verbosity is controlled with RUST_LOG (default: patient_migrator=warn)."
))]
pub struct Args {
    /// Write the run statistics as JSON to this file after a successful run
    #[arg(long, value_name = "FILE")]
    pub stats_json: Option<PathBuf>,
}

/// Set up structured logging on stderr
pub fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("patient_migrator=warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init();

    debug!("Logging initialized");
}

/// Run one migration using connection strings from the environment
pub fn run(args: &Args) -> Result<MigrationStats> {
    let config = MigrationConfig::from_env();
    debug!("Resolved configuration: {:?}", config);

    let stats = MigrationPipeline::new(config)
        .run()
        .context("Migration aborted")?;

    if let Some(path) = &args.stats_json {
        write_stats_json(&stats, path)?;
    }

    Ok(stats)
}

/// Save run statistics as pretty-printed JSON
pub fn write_stats_json(stats: &MigrationStats, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(stats).context("Failed to serialize run statistics")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write run statistics to {}", path.display()))?;

    info!("Run statistics written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_stats_json_flag_is_optional() {
        let args = Args::try_parse_from(["patient_migrator"]).unwrap();
        assert!(args.stats_json.is_none());

        let args =
            Args::try_parse_from(["patient_migrator", "--stats-json", "run.json"]).unwrap();
        assert_eq!(args.stats_json, Some(PathBuf::from("run.json")));
    }

    #[test]
    fn test_write_stats_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stats.json");
        let stats = MigrationStats {
            raw_rows: 5,
            persons_loaded: 5,
            diagnosis_rows: 9,
            clinical_events_loaded: 8,
            unmatched_diagnosis_rows: 1,
            ..Default::default()
        };

        write_stats_json(&stats, &path).unwrap();

        let json = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["persons_loaded"], 5);
        assert_eq!(value["unmatched_diagnosis_rows"], 1);

        let restored: MigrationStats = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, stats);
    }

    #[test]
    fn test_write_stats_json_to_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("stats.json");

        let err = write_stats_json(&MigrationStats::default(), &path).unwrap_err();
        assert!(err.to_string().contains("Failed to write run statistics"));
    }
}
