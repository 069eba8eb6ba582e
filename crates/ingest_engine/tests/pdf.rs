mod common;

use std::fs;

use common::{pdf_bytes, simple_pdf, PdfInfoFixture};
use ingest_core::{ContentKind, MAX_TEXT_CHARS, PDF_ERROR_TITLE};
use ingest_engine::{PdfExtractor, RawContentStore};
use tempfile::TempDir;

fn extractor(temp: &TempDir, max_chars: usize) -> (PdfExtractor, RawContentStore) {
    let store = RawContentStore::new(temp.path());
    (PdfExtractor::new(store.clone(), max_chars), store)
}

#[test]
fn extracts_pages_text_and_info_metadata() {
    engine_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let (pdf, store) = extractor(&temp, MAX_TEXT_CHARS);
    let bytes = pdf_bytes(
        &["First page", "Second page"],
        PdfInfoFixture {
            title: Some("Annual Report"),
            created: Some("D:20230102030405+00'00'"),
            modified: Some("D:20240506070809Z"),
        },
    );

    let record = pdf.extract("Annual Report", &bytes, "report.pdf");

    assert_eq!(record.kind, ContentKind::Pdf);
    assert_eq!(record.content_type, "application/pdf");
    assert_eq!(record.title, "Annual Report");
    assert_eq!(record.total_pages, Some(2));
    assert!(record.text.contains("First page"));
    assert!(record.text.contains("Second page"));
    assert!(record.text.find("First").unwrap() < record.text.find("Second").unwrap());
    assert_eq!(record.published_date.as_deref(), Some("2023-01-02 03:04:05"));
    assert_eq!(record.last_modified.as_deref(), Some("2024-05-06 07:08:09"));
    assert!(record.links.is_empty());

    let saved = record.saved_filepath.expect("saved");
    assert!(saved.starts_with(store.pdf_dir().to_str().unwrap()));
    assert_eq!(fs::read(saved).unwrap(), bytes);
    assert!(record.filename.unwrap().starts_with("Annual_Report_"));
}

#[test]
fn missing_title_falls_back_to_locator_name() {
    let temp = TempDir::new().unwrap();
    let (pdf, _) = extractor(&temp, MAX_TEXT_CHARS);
    let record = pdf.extract("Doc", &simple_pdf("body"), "whitepaper.pdf");
    assert_eq!(record.title, "whitepaper.pdf");
    assert_eq!(record.last_modified, None);
}

#[test]
fn malformed_info_dates_become_null() {
    let temp = TempDir::new().unwrap();
    let (pdf, _) = extractor(&temp, MAX_TEXT_CHARS);
    let bytes = pdf_bytes(
        &["body"],
        PdfInfoFixture {
            created: Some("yesterday"),
            ..PdfInfoFixture::default()
        },
    );
    let record = pdf.extract("Doc", &bytes, "doc.pdf");
    assert!(!record.is_error());
    assert_eq!(record.published_date, None);
}

#[test]
fn text_respects_character_cap() {
    let temp = TempDir::new().unwrap();
    let (pdf, _) = extractor(&temp, 5);
    let record = pdf.extract("Doc", &simple_pdf("Hello World"), "doc.pdf");
    assert_eq!(record.text, "Hello");
}

#[test]
fn empty_body_becomes_error_record() {
    let temp = TempDir::new().unwrap();
    let (pdf, store) = extractor(&temp, MAX_TEXT_CHARS);

    let record = pdf.extract("Empty", &[], "empty.pdf");

    assert!(record.is_error());
    assert_eq!(record.kind, ContentKind::Pdf);
    assert_eq!(record.title, PDF_ERROR_TITLE);
    assert_eq!(record.text, "Error: Empty PDF content received");
    assert_eq!(record.saved_filepath, None);
    assert_eq!(record.filename, None);
    assert_eq!(record.total_pages, Some(0));
    assert!(!store.pdf_dir().exists());
}

#[test]
fn unparsable_body_is_saved_but_reported_as_error() {
    let temp = TempDir::new().unwrap();
    let (pdf, store) = extractor(&temp, MAX_TEXT_CHARS);

    let record = pdf.extract("Broken", b"%PDF-1.4 this is not really a pdf", "broken.pdf");

    assert!(record.is_error());
    assert!(record.text.starts_with("Error: "));
    assert_eq!(record.saved_filepath, None);
    assert_eq!(fs::read_dir(store.pdf_dir()).unwrap().count(), 1);
}
