use url::Url;

/// Format decided for a fetched body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Html,
    Pdf,
    /// `.ppt`/`.pptx`; handled through a sibling PDF export.
    Presentation,
    /// Neither suffix nor content type was conclusive.
    Unknown,
}

/// One named extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionStep {
    /// Parse the body already fetched as HTML.
    Html,
    /// Parse the body already fetched as PDF.
    Pdf,
    /// Fetch another locator and parse that body as PDF.
    PdfAt(String),
}

/// Ordered strategies for one entry. The first step that yields a record wins;
/// when the last one fails the entry fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub format: FormatKind,
    pub steps: Vec<ExtractionStep>,
}

/// Choose the extraction path from the locator suffix, then the response content type.
///
/// The presentation rule assumes a PDF export lives next to the deck under the
/// same name. That holds for many publishing setups but is best-effort only.
pub fn classify(locator: &str, content_type: Option<&str>) -> ExtractionPlan {
    let path = locator_path(locator);
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();

    let (format, steps) = if has_suffix(&path, &[".html", ".htm"])
        || content_type.contains("text/html")
    {
        (FormatKind::Html, vec![ExtractionStep::Html])
    } else if has_suffix(&path, &[".pdf"]) || content_type.contains("application/pdf") {
        (FormatKind::Pdf, vec![ExtractionStep::Pdf])
    } else if has_suffix(&path, &[".ppt", ".pptx"]) {
        (
            FormatKind::Presentation,
            vec![ExtractionStep::PdfAt(replace_extension(locator, "pdf"))],
        )
    } else {
        (
            FormatKind::Unknown,
            vec![
                ExtractionStep::Html,
                ExtractionStep::PdfAt(append_extension(locator, "pdf")),
            ],
        )
    };

    ExtractionPlan { format, steps }
}

fn locator_path(locator: &str) -> String {
    match Url::parse(locator) {
        Ok(url) => url.path().to_ascii_lowercase(),
        Err(_) => locator
            .split(['?', '#'])
            .next()
            .unwrap_or(locator)
            .to_ascii_lowercase(),
    }
}

fn has_suffix(path: &str, suffixes: &[&str]) -> bool {
    suffixes.iter().any(|suffix| path.ends_with(suffix))
}

fn replace_extension(locator: &str, ext: &str) -> String {
    if let Ok(mut url) = Url::parse(locator) {
        if let Some((stem, _)) = url.path().rsplit_once('.') {
            let path = format!("{stem}.{ext}");
            url.set_path(&path);
            return url.into();
        }
    }
    match locator.rsplit_once('.') {
        Some((stem, _)) => format!("{stem}.{ext}"),
        None => format!("{locator}.{ext}"),
    }
}

fn append_extension(locator: &str, ext: &str) -> String {
    if let Ok(mut url) = Url::parse(locator) {
        let path = format!("{}.{ext}", url.path());
        url.set_path(&path);
        return url.into();
    }
    format!("{locator}.{ext}")
}
