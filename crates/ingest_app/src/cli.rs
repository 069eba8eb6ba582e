use std::path::PathBuf;

use clap::Parser;

/// Fetch, classify and extract a batch of URLs and local files into one JSON artifact.
#[derive(Parser, Debug, Default)]
#[command(name = "ingest")]
#[command(about = "Acquire and normalize web pages, PDFs and local documents", long_about = None)]
pub struct Cli {
    /// Source table (.xlsx, .xls, .ods or .csv): content name, then URL.
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// Directory scanned recursively for local documents.
    #[arg(long)]
    pub local_dir: Option<PathBuf>,

    /// Where the results file and saved originals go [default: scraped_data].
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Entries processed concurrently; 1 runs sequentially [default: 1].
    #[arg(long)]
    pub workers: Option<usize>,

    /// Log file written alongside terminal output [default: ./scraper.log].
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// RON file supplying defaults; flags given here win.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
