use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info};
use ingest_core::{ContentKind, ScrapedRecord, LOCAL_ROBOTS_STATUS};
use url::Url;

use crate::decode::decode_text;
use crate::html::{HtmlError, HtmlExtractor};
use crate::metadata::canonical_from_system_time;
use crate::pdf::PdfExtractor;

/// Extensions the directory scan queues.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "html", "htm", "ppt", "pptx", "doc", "docx", "txt"];

#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unsupported file type: {0}")]
    Unsupported(PathBuf),
    #[error(transparent)]
    Html(#[from] HtmlError),
}

/// Office formats that produce placeholder records instead of extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OfficeStub {
    Ppt,
    Pptx,
    Doc,
    Docx,
}

impl OfficeStub {
    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "ppt" => Some(Self::Ppt),
            "pptx" => Some(Self::Pptx),
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    fn mime(self) -> &'static str {
        match self {
            Self::Ppt => "application/vnd.ms-powerpoint",
            Self::Pptx => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            Self::Doc => "application/msword",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }

    fn kind(self) -> ContentKind {
        match self {
            Self::Ppt | Self::Pptx => ContentKind::Ppt,
            Self::Doc | Self::Docx => ContentKind::Doc,
        }
    }

    fn placeholder_text(self) -> &'static str {
        match self {
            Self::Ppt | Self::Pptx => "PowerPoint file - text extraction not yet supported",
            Self::Doc | Self::Docx => "Word document - text extraction not yet supported",
        }
    }
}

/// Extracts records from files on disk. No network, no robots check.
#[derive(Debug, Clone)]
pub struct LocalIngester {
    html: HtmlExtractor,
    pdf: PdfExtractor,
}

impl LocalIngester {
    pub fn new(html: HtmlExtractor, pdf: PdfExtractor) -> Self {
        Self { html, pdf }
    }

    pub fn ingest(&self, content_name: &str, path: &Path) -> Result<ScrapedRecord, LocalError> {
        let ext = extension_of(path);
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| content_name.to_string());
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let mtime = fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(canonical_from_system_time);
        engine_debug!("Local file {} ({}), mtime {:?}", path.display(), ext, mtime);

        let mut record = match ext.as_str() {
            "pdf" => self.pdf.extract(content_name, &read(path)?, &file_name),
            "html" | "htm" => self.html.extract(content_name, &read(path)?, None)?,
            "txt" => {
                // Valid UTF-8 is kept byte for byte, BOM included.
                let text = match String::from_utf8(read(path)?) {
                    Ok(text) => text,
                    Err(err) => decode_text(err.as_bytes(), None).text,
                };
                ScrapedRecord {
                    title: file_name.clone(),
                    text,
                    ..in_place(ContentKind::Text, "text/plain", &absolute, &file_name)
                }
            }
            other => {
                let stub = OfficeStub::from_extension(other)
                    .ok_or_else(|| LocalError::Unsupported(path.to_path_buf()))?;
                ScrapedRecord {
                    title: file_name.clone(),
                    text: stub.placeholder_text().to_string(),
                    ..in_place(stub.kind(), stub.mime(), &absolute, &file_name)
                }
            }
        };

        if record.last_modified.is_none() && !record.is_error() {
            record.last_modified = mtime;
        }
        record.original_filepath = Some(absolute.to_string_lossy().into_owned());
        engine_info!("Processed local file {} as {:?}", path.display(), record.kind);
        Ok(record.with_provenance(LOCAL_ROBOTS_STATUS, &file_reference(&absolute)))
    }
}

/// Lowercased extension without the dot; empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn read(path: &Path) -> Result<Vec<u8>, LocalError> {
    fs::read(path).map_err(|source| LocalError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Text and stub content already lives on disk, so the record points at it.
fn in_place(kind: ContentKind, mime: &str, absolute: &Path, file_name: &str) -> ScrapedRecord {
    ScrapedRecord {
        saved_filepath: Some(absolute.to_string_lossy().into_owned()),
        filename: Some(file_name.to_string()),
        ..ScrapedRecord::blank(kind, mime)
    }
}

fn file_reference(absolute: &Path) -> String {
    Url::from_file_path(absolute)
        .map(String::from)
        .unwrap_or_else(|_| format!("file://{}", absolute.display()))
}
