//! Ingest engine: fetching, extraction, persistence and batch orchestration.
mod decode;
mod fetch;
mod filename;
mod html;
mod local;
mod metadata;
mod pdf;
mod persist;
mod pipeline;
mod registry;
mod remote;
mod results;
mod robots;
mod types;

pub use decode::{decode_text, looks_binary, DecodedText};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_USER_AGENT};
pub use filename::generated_filename;
pub use html::{parse_html_page, HtmlError, HtmlExtractor, HtmlPage};
pub use local::{extension_of, LocalError, LocalIngester, SUPPORTED_EXTENSIONS};
pub use metadata::{
    article_time_date, canonical_from_system_time, format_canonical, infer_page_dates,
    json_ld_date, meta_tag_date, normalize_timestamp, parse_pdf_date, parse_timestamp,
    text_pattern_date, DateField, DateProbe, PageDates, DATE_PROBES,
};
pub use pdf::{read_info, title_from_locator, PdfError, PdfExtractor, PdfInfo};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, RawContentStore, SavedFile};
pub use pipeline::{BatchReport, EntryError, IngestConfig, Pipeline};
pub use registry::{load_table, scan_directory, SourceLoadError};
pub use remote::{RemoteError, RemoteExtractor, StepResult};
pub use results::{write_results, RESULTS_FILENAME};
pub use robots::{
    PolitenessGate, RobotsDecision, RobotsSettings, REASON_ALLOWED, REASON_CHECK_ERROR,
    REASON_DISALLOWED, REASON_NO_RESTRICTIONS,
};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
