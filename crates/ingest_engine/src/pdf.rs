use encoding_rs::{UTF_16BE, WINDOWS_1252};
use engine_logging::{engine_error, engine_info};
use ingest_core::{truncate_chars, ContentKind, ScrapedRecord};
use lopdf::{Dictionary, Document, Object};

use crate::metadata::parse_pdf_date;
use crate::persist::{PersistError, RawContentStore};

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Empty PDF content received")]
    EmptyContent,
    #[error("failed to save pdf: {0}")]
    Persist(#[from] PersistError),
    #[error("{0}")]
    Parse(#[from] lopdf::Error),
}

/// Document info fields read from the trailer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PdfInfo {
    pub title: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
}

/// Saves the raw bytes, then pulls text and info metadata from them.
///
/// Never fails: anything that goes wrong becomes an error record.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    store: RawContentStore,
    max_text_chars: usize,
}

impl PdfExtractor {
    pub fn new(store: RawContentStore, max_text_chars: usize) -> Self {
        Self {
            store,
            max_text_chars,
        }
    }

    /// `fallback_title` is used when the document has no usable `/Title`.
    pub fn extract(&self, content_name: &str, bytes: &[u8], fallback_title: &str) -> ScrapedRecord {
        match self.try_extract(content_name, bytes, fallback_title) {
            Ok(record) => record,
            Err(err) => {
                engine_error!("Error processing PDF for '{}': {}", content_name, err);
                ScrapedRecord::pdf_error(&err.to_string())
            }
        }
    }

    fn try_extract(
        &self,
        content_name: &str,
        bytes: &[u8],
        fallback_title: &str,
    ) -> Result<ScrapedRecord, PdfError> {
        if bytes.is_empty() {
            return Err(PdfError::EmptyContent);
        }
        let saved = self.store.save_pdf(content_name, bytes)?;

        let doc = Document::load_mem(bytes)?;
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let mut page_texts = Vec::with_capacity(pages.len());
        for page in &pages {
            page_texts.push(doc.extract_text(&[*page])?.trim().to_string());
        }
        let text = truncate_chars(&page_texts.join("\n"), self.max_text_chars);
        let info = read_info(&doc);

        engine_info!(
            "Extracted PDF '{}': {} pages, {} chars",
            content_name,
            pages.len(),
            text.chars().count()
        );

        Ok(ScrapedRecord {
            title: info
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| fallback_title.to_string()),
            text,
            last_modified: info.modified,
            published_date: info.created,
            total_pages: Some(u32::try_from(pages.len()).unwrap_or(u32::MAX)),
            saved_filepath: Some(saved.path_string()),
            filename: Some(saved.filename),
            ..ScrapedRecord::blank(ContentKind::Pdf, "application/pdf")
        })
    }
}

/// Title and dates from the `/Info` dictionary. Missing or malformed entries
/// are simply absent.
pub fn read_info(doc: &Document) -> PdfInfo {
    let Some(info) = info_dictionary(doc) else {
        return PdfInfo::default();
    };
    let field = |key: &[u8]| match info.get(key) {
        Ok(Object::String(bytes, _)) => Some(decode_pdf_string(bytes)),
        _ => None,
    };
    PdfInfo {
        title: field(b"Title"),
        created: field(b"CreationDate").and_then(|raw| parse_pdf_date(&raw)),
        modified: field(b"ModDate").and_then(|raw| parse_pdf_date(&raw)),
    }
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Text strings are UTF-16BE when they open with a byte order mark, otherwise
/// PDFDocEncoding, which agrees with Windows-1252 on printable characters.
fn decode_pdf_string(bytes: &[u8]) -> String {
    let decoded = match bytes {
        [0xFE, 0xFF, rest @ ..] => UTF_16BE.decode_without_bom_handling(rest).0,
        _ => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    };
    decoded.trim_end_matches('\0').to_string()
}

/// Last path segment of a URL or path, used as a title of last resort.
pub fn title_from_locator(locator: &str) -> String {
    let path = locator.split(['?', '#']).next().unwrap_or(locator);
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(locator)
        .to_string()
}
