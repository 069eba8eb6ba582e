use std::path::{Path, PathBuf};
use std::sync::Arc;

use engine_logging::{engine_error, engine_info};
use futures_util::StreamExt;
use ingest_core::{
    BatchResult, ContentEntry, Locator, Origin, RunSummary, ScrapedRecord, SourceKind,
    MAX_TEXT_CHARS,
};

use crate::fetch::{FetchSettings, Fetcher, ReqwestFetcher};
use crate::html::HtmlExtractor;
use crate::local::{LocalError, LocalIngester};
use crate::pdf::PdfExtractor;
use crate::persist::{ensure_output_dir, PersistError, RawContentStore};
use crate::remote::{RemoteError, RemoteExtractor};
use crate::results::{write_results, RESULTS_FILENAME};
use crate::robots::{PolitenessGate, RobotsSettings};

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Root of the artifact and the `html/`/`pdf/` directories.
    pub output_dir: PathBuf,
    pub results_filename: String,
    /// Entries in flight at once; 1 is sequential.
    pub workers: usize,
    /// Cap on extracted HTML and PDF text, in characters.
    pub max_text_chars: usize,
    pub fetch: FetchSettings,
    pub robots: RobotsSettings,
}

impl IngestConfig {
    pub fn default_with_output(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            results_filename: RESULTS_FILENAME.to_string(),
            workers: 1,
            max_text_chars: MAX_TEXT_CHARS,
            fetch: FetchSettings::default(),
            robots: RobotsSettings::default(),
        }
    }

    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(&self.results_filename)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self::default_with_output("scraped_data")
    }
}

/// Per-entry failure. Caught at the entry boundary, logged and counted.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Local(#[from] LocalError),
    #[error("worker aborted: {0}")]
    Panicked(String),
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Vec<BatchResult>,
    pub summary: RunSummary,
    pub artifact_path: PathBuf,
}

/// Everything one worker needs to process an entry.
#[derive(Clone)]
struct EntryWorker {
    remote: RemoteExtractor,
    local: LocalIngester,
}

impl EntryWorker {
    async fn process(self, entry: ContentEntry) -> Result<ScrapedRecord, EntryError> {
        match entry.origin {
            Origin::Remote => Ok(self.remote.extract(&entry).await?),
            Origin::Local => {
                engine_info!(
                    "Starting to process local file: {} for content: {}",
                    entry.locator,
                    entry.content_name
                );
                let local = self.local;
                tokio::task::spawn_blocking(move || {
                    local.ingest(&entry.content_name, Path::new(&entry.locator))
                })
                .await
                .map_err(|err| EntryError::Panicked(err.to_string()))?
                .map_err(EntryError::from)
            }
        }
    }
}

/// Drives every entry through extraction and writes the artifact once.
pub struct Pipeline {
    config: IngestConfig,
    store: RawContentStore,
    worker: EntryWorker,
}

impl Pipeline {
    pub fn new(config: IngestConfig) -> Self {
        let fetcher = Arc::new(ReqwestFetcher::new(config.fetch.clone()));
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: IngestConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let store = RawContentStore::new(&config.output_dir);
        let html = HtmlExtractor::new(store.clone(), config.max_text_chars);
        let pdf = PdfExtractor::new(store.clone(), config.max_text_chars);
        let gate = Arc::new(PolitenessGate::new(config.robots.clone()));
        let worker = EntryWorker {
            remote: RemoteExtractor::new(fetcher, gate, html.clone(), pdf.clone()),
            local: LocalIngester::new(html, pdf),
        };
        Self {
            config,
            store,
            worker,
        }
    }

    /// Process remote entries, then local ones, and persist the results.
    ///
    /// Entry failures never abort the run; only an unwritable output location does.
    pub async fn run(&self, entries: Vec<ContentEntry>) -> Result<BatchReport, PersistError> {
        ensure_output_dir(&self.config.output_dir)?;
        self.store.prepare()?;

        let (remote, local): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| entry.origin == Origin::Remote);
        engine_info!(
            "Starting batch: {} remote, {} local entries, {} worker(s)",
            remote.len(),
            local.len(),
            self.config.workers.max(1)
        );

        let total = remote.len() + local.len();
        // Order-preserving: results come back in input order whatever finishes first.
        let mut outcomes = futures_util::stream::iter(remote.into_iter().chain(local))
            .map(|entry| {
                let handle = tokio::spawn(self.worker.clone().process(entry.clone()));
                async move {
                    let outcome = handle
                        .await
                        .unwrap_or_else(|err| Err(EntryError::Panicked(err.to_string())));
                    (entry, outcome)
                }
            })
            .buffered(self.config.workers.max(1));

        let mut summary = RunSummary::new();
        let mut results = Vec::with_capacity(total);
        while let Some((entry, outcome)) = outcomes.next().await {
            match outcome {
                Ok(record) => {
                    summary.record_success(entry.origin);
                    results.push(batch_result(entry, record));
                }
                Err(err) => {
                    summary.record_failure(entry.origin);
                    engine_error!(
                        "Failed to process {} '{}' ({}): {}",
                        entry.origin,
                        entry.content_name,
                        entry.locator,
                        err
                    );
                }
            }
            engine_info!(
                "Progress: {}/{} processed ({} successful, {} failed)",
                summary.total(),
                total,
                summary.successful(),
                summary.failed()
            );
        }

        log_summary(&summary);
        let artifact_path =
            write_results(&self.config.output_dir, &self.config.results_filename, &results)?;
        Ok(BatchReport {
            results,
            summary,
            artifact_path,
        })
    }
}

fn batch_result(entry: ContentEntry, content: ScrapedRecord) -> BatchResult {
    let (locator, source) = match entry.origin {
        Origin::Remote => (Locator::Url(entry.locator), SourceKind::Url),
        Origin::Local => (Locator::FilePath(entry.locator), SourceKind::LocalFile),
    };
    BatchResult {
        content_name: entry.content_name,
        locator,
        content,
        source,
    }
}

fn log_summary(summary: &RunSummary) {
    for origin in [Origin::Remote, Origin::Local] {
        let tally = summary.tally(origin);
        engine_info!(
            "{} entries: {} total, {} successful, {} failed",
            origin,
            tally.total,
            tally.successful,
            tally.failed
        );
    }
    engine_info!(
        "Batch complete: {} total, {} successful, {} failed, success rate {:.2}%",
        summary.total(),
        summary.successful(),
        summary.failed(),
        summary.success_rate()
    );
}
