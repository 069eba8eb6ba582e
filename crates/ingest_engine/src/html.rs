use engine_logging::{engine_debug, engine_info};
use ingest_core::{truncate_chars, ContentKind, ScrapedRecord, NO_TITLE};
use scraper::{Html, Selector};

use crate::decode::{decode_text, looks_binary};
use crate::metadata::{infer_page_dates, PageDates};
use crate::persist::{PersistError, RawContentStore, SavedFile};

#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("body is binary, not markup")]
    Binary,
    #[error("failed to save html: {0}")]
    Persist(#[from] PersistError),
}

/// Fields pulled from one HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPage {
    pub title: String,
    pub text: String,
    pub links: Vec<String>,
    pub dates: PageDates,
}

/// Parse `html` into title, paragraph text (capped at `max_text_chars`),
/// raw anchor targets and inferred dates.
pub fn parse_html_page(html: &str, max_text_chars: usize) -> HtmlPage {
    let doc = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| doc.select(&sel).next().map(|t| t.text().collect::<String>()))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE.to_string());

    let paragraphs: Vec<String> = Selector::parse("p")
        .map(|sel| {
            doc.select(&sel)
                .map(|p| p.text().collect::<String>().trim().to_string())
                .collect()
        })
        .unwrap_or_default();
    let text = truncate_chars(&paragraphs.join(" "), max_text_chars);

    // Every href, as written: no resolution, filtering or dedup.
    let links = Selector::parse("a[href]")
        .map(|sel| {
            doc.select(&sel)
                .filter_map(|a| a.value().attr("href"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    HtmlPage {
        title,
        text,
        links,
        dates: infer_page_dates(&doc),
    }
}

impl HtmlPage {
    pub fn into_record(self, saved: &SavedFile) -> ScrapedRecord {
        ScrapedRecord {
            title: self.title,
            text: self.text,
            links: self.links,
            last_modified: self.dates.last_modified,
            updated_time: self.dates.updated_time,
            published_date: self.dates.published_date,
            saved_filepath: Some(saved.path_string()),
            filename: Some(saved.filename.clone()),
            ..ScrapedRecord::blank(ContentKind::Html, "text/html")
        }
    }
}

/// Saves the raw page, then extracts it.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    store: RawContentStore,
    max_text_chars: usize,
}

impl HtmlExtractor {
    pub fn new(store: RawContentStore, max_text_chars: usize) -> Self {
        Self {
            store,
            max_text_chars,
        }
    }

    /// The save happens before parsing so the original survives any later step.
    pub fn extract(
        &self,
        content_name: &str,
        body: &[u8],
        content_type: Option<&str>,
    ) -> Result<ScrapedRecord, HtmlError> {
        if looks_binary(body) {
            return Err(HtmlError::Binary);
        }
        let decoded = decode_text(body, content_type);
        engine_debug!("Decoded '{}' as {}", content_name, decoded.encoding_label);
        let saved = self.store.save_html(content_name, &decoded.text)?;

        let page = parse_html_page(&decoded.text, self.max_text_chars);
        engine_info!(
            "Extracted HTML '{}': {} chars, {} links, dates {:?}",
            page.title,
            page.text.chars().count(),
            page.links.len(),
            page.dates
        );
        Ok(page.into_record(&saved))
    }
}
