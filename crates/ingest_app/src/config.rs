use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use ingest_engine::IngestConfig;
use serde::Deserialize;

use crate::cli::Cli;

const DEFAULT_OUTPUT_DIR: &str = "scraped_data";
const DEFAULT_LOG_FILE: &str = "./scraper.log";

/// Optional RON configuration. Every field may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub sources: Option<PathBuf>,
    pub local_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub results_filename: Option<String>,
    pub workers: Option<usize>,
    pub max_text_chars: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub min_delay_secs: Option<f64>,
    pub max_delay_secs: Option<f64>,
    pub user_agent: Option<String>,
    pub log_file: Option<PathBuf>,
}

pub fn load_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    ron::from_str(&content).with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub sources: Option<PathBuf>,
    pub local_dir: Option<PathBuf>,
    pub log_file: PathBuf,
    pub ingest: IngestConfig,
}

/// Merge flags over the file config over built-in defaults.
pub fn resolve(cli: &Cli, file: FileConfig) -> Result<RunPlan> {
    let sources = cli.sources.clone().or(file.sources);
    let local_dir = cli.local_dir.clone().or(file.local_dir);
    if sources.is_none() && local_dir.is_none() {
        bail!("nothing to ingest: pass --sources, --local-dir, or both");
    }

    let workers = cli.workers.or(file.workers).unwrap_or(1);
    if workers == 0 {
        bail!("--workers must be at least 1");
    }

    let output_dir = cli
        .output_dir
        .clone()
        .or(file.output_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let mut ingest = IngestConfig::default_with_output(output_dir);
    ingest.workers = workers;
    if let Some(name) = file.results_filename {
        ingest.results_filename = name;
    }
    if let Some(max) = file.max_text_chars {
        ingest.max_text_chars = max;
    }
    if let Some(secs) = file.request_timeout_secs {
        ingest.fetch.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.min_delay_secs {
        ingest.fetch.min_delay = delay(secs, "min_delay_secs")?;
    }
    if let Some(secs) = file.max_delay_secs {
        ingest.fetch.max_delay = delay(secs, "max_delay_secs")?;
    }
    if let Some(agent) = file.user_agent {
        ingest.robots.user_agent = agent.clone();
        ingest.fetch.user_agent = agent;
    }

    Ok(RunPlan {
        sources,
        local_dir,
        log_file: cli
            .log_file
            .clone()
            .or(file.log_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        ingest,
    })
}

fn delay(secs: f64, field: &str) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).with_context(|| format!("{field} must be a non-negative number"))
}
