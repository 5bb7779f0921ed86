//! TSV Import Tool
//!
//! Imports pieces, and the composers and arrangers they credit, from a tab
//! separated spreadsheet export into the catalog database.

use anyhow::{Context, Result};
use clap::Parser;
use sheet_catalog_server::catalog_store::SqliteCatalogStore;
use sheet_catalog_server::tsv_import::TsvImporter;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cli-import-tsv")]
#[command(about = "Import pieces from a TSV file into the catalog database")]
struct Args {
    /// Path to the SQLite catalog database file. Created if missing.
    #[arg(long, value_name = "DB")]
    db: PathBuf,

    /// Path to the TSV file to import.
    #[arg(long, value_name = "TSV")]
    input: PathBuf,

    /// Write the per-row outcome as JSON to this file.
    #[arg(long, value_name = "JSON")]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("Input file: {}", args.input.display());
    info!("Catalog database: {}", args.db.display());

    let store = SqliteCatalogStore::new(&args.db, 1)?;
    let persons = store.persons();
    let pieces = store.pieces();

    let report = TsvImporter::new(&persons, &pieces)
        .import_file(&args.input)
        .with_context(|| format!("Failed to import {}", args.input.display()))?;

    if report.summary.skipped > 0 {
        warn!("{} rows were skipped", report.summary.skipped);
    }

    if let Some(report_path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(report_path, json)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
        info!("Report written to {}", report_path.display());
    }

    Ok(())
}
