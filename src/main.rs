use clap::Parser;
use colored::*;
use patient_migrator::MigrationError;
use patient_migrator::cli::{self, Args};
use std::process;

fn main() {
    let args = Args::parse();
    cli::setup_logging();

    match cli::run(&args) {
        Ok(_stats) => {
            // Success - stats have already been reported by the pipeline
            process::exit(0);
        }
        Err(error) => {
            eprintln!("{} {:#}", "Error:".bright_red().bold(), error);

            if let Some(hint) = error
                .downcast_ref::<MigrationError>()
                .and_then(MigrationError::remediation)
            {
                eprintln!("{}", hint);
            }
            process::exit(1);
        }
    }
}
