use std::sync::Arc;

use engine_logging::{engine_info, engine_warn};
use ingest_core::{classify, ContentEntry, ExtractionStep, ScrapedRecord};

use crate::fetch::Fetcher;
use crate::html::HtmlExtractor;
use crate::metadata::normalize_timestamp;
use crate::pdf::{title_from_locator, PdfExtractor};
use crate::robots::PolitenessGate;
use crate::{FetchError, FetchOutput};

/// Why a remote entry produced no record.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("blocked for {locator}: {reason}")]
    Disallowed { locator: String, reason: String },
    #[error("request failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("every extraction strategy failed; last: {0}")]
    Exhausted(String),
}

/// Tagged outcome of one extraction strategy.
#[derive(Debug)]
pub enum StepResult {
    Extracted {
        record: ScrapedRecord,
        final_url: String,
    },
    /// Fetch this locator and run the PDF path on it.
    Retry(String),
    Failed(String),
}

/// Runs the politeness check, the primary fetch and the classified strategy
/// chain for one remote entry.
#[derive(Clone)]
pub struct RemoteExtractor {
    fetcher: Arc<dyn Fetcher>,
    gate: Arc<PolitenessGate>,
    html: HtmlExtractor,
    pdf: PdfExtractor,
}

impl RemoteExtractor {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        gate: Arc<PolitenessGate>,
        html: HtmlExtractor,
        pdf: PdfExtractor,
    ) -> Self {
        Self {
            fetcher,
            gate,
            html,
            pdf,
        }
    }

    pub async fn extract(&self, entry: &ContentEntry) -> Result<ScrapedRecord, RemoteError> {
        let locator = entry.locator.as_str();
        engine_info!(
            "Starting to process URL: {} for content: {}",
            locator,
            entry.content_name
        );

        let decision = self.gate.is_allowed(locator).await;
        if !decision.allowed {
            engine_warn!(
                "URL blocked by robots.txt: {} for content '{}': {}",
                locator,
                entry.content_name,
                decision.reason
            );
            return Err(RemoteError::Disallowed {
                locator: locator.to_string(),
                reason: decision.reason,
            });
        }

        let primary = self.fetcher.fetch(locator).await?;
        let plan = classify(locator, primary.metadata.content_type.as_deref());
        engine_info!(
            "Detected format {:?} for {} (content-type {:?}, {} bytes)",
            plan.format,
            locator,
            primary.metadata.content_type,
            primary.metadata.byte_len
        );

        let mut last_failure = String::from("no extraction strategy applied");
        for step in plan.steps {
            let outcome = match step {
                ExtractionStep::Html => self.html_step(&entry.content_name, primary.clone()).await,
                ExtractionStep::Pdf => self.pdf_step(&entry.content_name, primary.clone()).await,
                ExtractionStep::PdfAt(next) => StepResult::Retry(next),
            };
            let outcome = match outcome {
                StepResult::Retry(next) => self.follow(&entry.content_name, &next).await,
                done => done,
            };

            match outcome {
                StepResult::Extracted { record, final_url } => {
                    engine_info!(
                        "Successfully completed processing {} for content '{}'",
                        locator,
                        entry.content_name
                    );
                    return Ok(record.with_provenance(&decision.reason, &final_url));
                }
                StepResult::Failed(reason) => {
                    engine_warn!("Strategy failed for {}: {}", locator, reason);
                    last_failure = reason;
                }
                StepResult::Retry(next) => {
                    last_failure = format!("fallback to {next} was not followed");
                }
            }
        }
        Err(RemoteError::Exhausted(last_failure))
    }

    async fn html_step(&self, content_name: &str, fetched: FetchOutput) -> StepResult {
        let html = self.html.clone();
        let name = content_name.to_string();
        let FetchOutput { bytes, metadata } = fetched;
        let content_type = metadata.content_type.clone();

        let extracted =
            tokio::task::spawn_blocking(move || html.extract(&name, &bytes, content_type.as_deref()))
                .await;
        match extracted {
            Ok(Ok(mut record)) => {
                if record.last_modified.is_none() {
                    record.last_modified = metadata.last_modified.as_deref().map(normalize_timestamp);
                }
                StepResult::Extracted {
                    record,
                    final_url: metadata.final_url,
                }
            }
            Ok(Err(err)) => {
                StepResult::Failed(format!("html extraction of {}: {err}", metadata.final_url))
            }
            Err(err) => StepResult::Failed(format!(
                "html extraction of {} aborted: {err}",
                metadata.final_url
            )),
        }
    }

    async fn pdf_step(&self, content_name: &str, fetched: FetchOutput) -> StepResult {
        let pdf = self.pdf.clone();
        let name = content_name.to_string();
        let final_url = fetched.metadata.final_url;
        let title = title_from_locator(&final_url);
        let bytes = fetched.bytes;

        match tokio::task::spawn_blocking(move || pdf.extract(&name, &bytes, &title)).await {
            Ok(record) => StepResult::Extracted { record, final_url },
            Err(err) => StepResult::Failed(format!("pdf extraction of {final_url} aborted: {err}")),
        }
    }

    /// Secondary fetch for the presentation rewrite and the unknown-format
    /// fallback. A failed fetch ends this step with no further fallback.
    async fn follow(&self, content_name: &str, next: &str) -> StepResult {
        engine_info!("Trying PDF fallback URL: {}", next);
        match self.fetcher.fetch(next).await {
            Ok(fetched) => self.pdf_step(content_name, fetched).await,
            Err(err) => StepResult::Failed(format!("fallback fetch of {next}: {err}")),
        }
    }
}
