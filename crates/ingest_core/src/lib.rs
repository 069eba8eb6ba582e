//! Ingest core: pure data model, format classification and run tallies.
mod classify;
mod entry;
mod record;
mod summary;
mod text;

pub use classify::{classify, ExtractionPlan, ExtractionStep, FormatKind};
pub use entry::{ContentEntry, Origin};
pub use record::{
    BatchResult, ContentKind, Locator, ScrapedRecord, SourceKind, CANONICAL_TIMESTAMP_FORMAT,
    LOCAL_ROBOTS_STATUS, MAX_TEXT_CHARS, NO_TITLE, PDF_ERROR_TITLE,
};
pub use summary::{OutcomeTally, RunSummary};
pub use text::truncate_chars;
