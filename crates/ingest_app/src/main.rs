mod cli;
mod config;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::engine_info;
use ingest_core::ContentEntry;
use ingest_engine::{load_table, scan_directory, Pipeline};

use crate::cli::Cli;
use crate::config::{load_file, resolve, FileConfig, RunPlan};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = match &cli.config {
        Some(path) => load_file(path)?,
        None => FileConfig::default(),
    };
    let plan = resolve(&cli, file_config)?;
    logging::initialize(&plan.log_file);

    let entries = collect_entries(&plan)?;
    let pipeline = Pipeline::new(plan.ingest);
    let report = pipeline
        .run(entries)
        .await
        .context("failed to write results")?;

    println!(
        "Processed {} entries ({} successful, {} failed, {:.2}% success). Results: {}",
        report.summary.total(),
        report.summary.successful(),
        report.summary.failed(),
        report.summary.success_rate(),
        report.artifact_path.display()
    );
    Ok(())
}

/// Source table entries first, then local files. A malformed table aborts
/// before anything is fetched.
fn collect_entries(plan: &RunPlan) -> Result<Vec<ContentEntry>> {
    let mut entries = Vec::new();
    if let Some(sources) = &plan.sources {
        engine_info!("Loading content data from {}", sources.display());
        entries.extend(
            load_table(sources)
                .with_context(|| format!("failed to load sources from {}", sources.display()))?,
        );
    }
    if let Some(dir) = &plan.local_dir {
        engine_info!("Scanning local directory {}", dir.display());
        entries.extend(scan_directory(dir));
    }
    Ok(entries)
}
