use serde::{Deserialize, Serialize};

/// Character cap applied to extracted HTML and PDF text.
pub const MAX_TEXT_CHARS: usize = 5_000;
/// Title used when an HTML page carries no `<title>`.
pub const NO_TITLE: &str = "No title found";
/// Title of the placeholder record produced when PDF extraction fails.
pub const PDF_ERROR_TITLE: &str = "Error processing PDF";
/// `robots_status` value for entries that never touch the network.
pub const LOCAL_ROBOTS_STATUS: &str = "Local file - robots.txt not applicable";
/// `strftime` pattern of the canonical timestamp form.
pub const CANONICAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The `type` tag of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Html,
    Pdf,
    Text,
    Ppt,
    Doc,
}

/// Normalized extraction result for one entry.
///
/// Either a full extraction or an error record (see [`ScrapedRecord::pdf_error`]);
/// `content_type` and `type` are always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedRecord {
    pub title: String,
    pub text: String,
    pub links: Vec<String>,
    pub content_type: String,
    pub last_modified: Option<String>,
    pub updated_time: Option<String>,
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
    pub saved_filepath: Option<String>,
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filepath: Option<String>,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub robots_status: String,
    pub final_url: String,
}

impl ScrapedRecord {
    /// A record with the given kind and MIME type and every content field empty.
    pub fn blank(kind: ContentKind, content_type: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            links: Vec::new(),
            content_type: content_type.into(),
            last_modified: None,
            updated_time: None,
            published_date: None,
            total_pages: None,
            saved_filepath: None,
            filename: None,
            original_filepath: None,
            kind,
            robots_status: String::new(),
            final_url: String::new(),
        }
    }

    /// Placeholder emitted when a PDF body cannot be processed.
    ///
    /// The entry still counts as processed; the failure travels in `text`.
    pub fn pdf_error(message: &str) -> Self {
        Self {
            title: PDF_ERROR_TITLE.to_string(),
            text: format!("Error: {message}"),
            total_pages: Some(0),
            ..Self::blank(ContentKind::Pdf, "application/pdf")
        }
    }

    pub fn is_error(&self) -> bool {
        self.title == PDF_ERROR_TITLE && self.saved_filepath.is_none()
    }

    /// Stamp the compliance reason and resolved locator onto the record.
    pub fn with_provenance(mut self, robots_status: &str, final_url: &str) -> Self {
        self.robots_status = robots_status.to_string();
        self.final_url = final_url.to_string();
        self
    }
}

/// Where a batch result came from, serialized as the `source` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Url,
    LocalFile,
}

/// The entry's locator, serialized under `url` or `file_path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    #[serde(rename = "url")]
    Url(String),
    #[serde(rename = "file_path")]
    FilePath(String),
}

/// One successfully attempted entry in the persisted artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub content_name: String,
    #[serde(flatten)]
    pub locator: Locator,
    pub content: ScrapedRecord,
    pub source: SourceKind,
}
