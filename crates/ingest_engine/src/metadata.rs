//! Date metadata inference and canonical timestamp normalization.
//!
//! HTML dates are found by an ordered ladder of probes, each a pure function
//! of the parsed document. Every field walks the ladder on its own and stops at
//! the first probe that yields a non-empty value. Recognized values are then
//! rewritten to `YYYY-MM-DD HH:MM:SS`; values that cannot be parsed are kept
//! verbatim.

use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use engine_logging::{engine_debug, engine_warn};
use ingest_core::CANONICAL_TIMESTAMP_FORMAT;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    LastModified,
    UpdatedTime,
    PublishedDate,
}

impl DateField {
    pub const ALL: [DateField; 3] = [
        DateField::LastModified,
        DateField::UpdatedTime,
        DateField::PublishedDate,
    ];

    fn meta_keywords(self) -> &'static [&'static str] {
        match self {
            DateField::LastModified => &["modified", "last-modified", "lastmod"],
            DateField::UpdatedTime => &["updated", "update-time", "last-updated"],
            DateField::PublishedDate => &["published", "created", "date", "pubdate", "publication"],
        }
    }

    fn json_ld_keys(self) -> &'static [&'static str] {
        match self {
            DateField::LastModified => &["dateModified", "modifiedDate"],
            DateField::UpdatedTime => &["dateUpdated", "updateTime"],
            DateField::PublishedDate => &["datePublished", "publishedDate"],
        }
    }

    fn time_class(self) -> &'static str {
        match self {
            DateField::LastModified => "modified",
            DateField::UpdatedTime => "updated",
            DateField::PublishedDate => "published",
        }
    }

    fn text_pattern(self) -> &'static Regex {
        match self {
            DateField::LastModified => &MODIFIED_TEXT,
            DateField::UpdatedTime => &UPDATED_TEXT,
            DateField::PublishedDate => &PUBLISHED_TEXT,
        }
    }
}

static MODIFIED_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:last\s+)?(?:modified|changed)\s+(?:on|at)?\s*([A-Za-z]+\s+\d{1,2},?\s+\d{4})")
        .unwrap()
});
static UPDATED_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:last\s+)?(?:updated|revised)\s+(?:on|at)?\s*([A-Za-z]+\s+\d{1,2},?\s+\d{4})")
        .unwrap()
});
static PUBLISHED_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:published|posted|created)\s+(?:on|at)?\s*([A-Za-z]+\s+\d{1,2},?\s+\d{4})")
        .unwrap()
});

/// Date fields inferred for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageDates {
    pub last_modified: Option<String>,
    pub updated_time: Option<String>,
    pub published_date: Option<String>,
}

impl PageDates {
    fn slot(&mut self, field: DateField) -> &mut Option<String> {
        match field {
            DateField::LastModified => &mut self.last_modified,
            DateField::UpdatedTime => &mut self.updated_time,
            DateField::PublishedDate => &mut self.published_date,
        }
    }
}

/// A single rung of the inference ladder.
pub type DateProbe = fn(&Html, DateField) -> Option<String>;

/// Probes in priority order.
pub const DATE_PROBES: &[(&str, DateProbe)] = &[
    ("meta tag", meta_tag_date as DateProbe),
    ("structured data", json_ld_date as DateProbe),
    ("article time", article_time_date as DateProbe),
    ("text pattern", text_pattern_date as DateProbe),
];

/// Run the ladder for every field and normalize what it finds.
pub fn infer_page_dates(doc: &Html) -> PageDates {
    let mut dates = PageDates::default();
    for field in DateField::ALL {
        let found = DATE_PROBES
            .iter()
            .find_map(|(source, probe)| probe(doc, field).map(|raw| (*source, raw)));
        if let Some((source, raw)) = found {
            engine_debug!("Found {:?} from {}: {}", field, source, raw);
            *dates.slot(field) = Some(normalize_timestamp(&raw));
        }
    }
    dates
}

/// `<meta>` tags whose `property` or `name` contains one of the field's keywords.
pub fn meta_tag_date(doc: &Html, field: DateField) -> Option<String> {
    let selector = Selector::parse("meta").ok()?;
    let keywords = field.meta_keywords();
    doc.select(&selector).find_map(|meta| {
        let attrs = meta.value();
        let property = attrs.attr("property").unwrap_or_default().to_lowercase();
        let name = attrs.attr("name").unwrap_or_default().to_lowercase();
        let matches = keywords
            .iter()
            .any(|k| property.contains(k) || name.contains(k));
        if matches {
            non_empty(attrs.attr("content").unwrap_or_default())
        } else {
            None
        }
    })
}

/// JSON-LD blocks, including top-level arrays and `@graph` containers.
pub fn json_ld_date(doc: &Html, field: DateField) -> Option<String> {
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).ok()?;
    doc.select(&selector).find_map(|script| {
        let raw = script.text().collect::<String>();
        let value = serde_json::from_str::<Value>(raw.trim()).ok()?;
        find_json_ld_date(&value, field.json_ld_keys())
    })
}

fn find_json_ld_date(value: &Value, keys: &[&str]) -> Option<String> {
    match value {
        Value::Object(map) => {
            let direct = keys.iter().find_map(|key| match map.get(*key) {
                Some(Value::String(s)) => non_empty(s),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            });
            direct.or_else(|| {
                ["@graph", "mainEntity"]
                    .iter()
                    .filter_map(|holder| map.get(*holder))
                    .find_map(|inner| find_json_ld_date(inner, keys))
            })
        }
        Value::Array(items) => items.iter().find_map(|item| find_json_ld_date(item, keys)),
        _ => None,
    }
}

/// `<time datetime>` elements inside the first `<article>`, classed by field.
pub fn article_time_date(doc: &Html, field: DateField) -> Option<String> {
    let article_sel = Selector::parse("article").ok()?;
    let time_sel = Selector::parse("time[datetime]").ok()?;
    let article = doc.select(&article_sel).next()?;
    let class = field.time_class();
    article.select(&time_sel).find_map(|time| {
        let classed = time.value().classes().any(|c| c == class);
        if classed {
            non_empty(time.value().attr("datetime").unwrap_or_default())
        } else {
            None
        }
    })
}

/// Free-text phrases such as "Last updated on March 3, 2024".
pub fn text_pattern_date(doc: &Html, field: DateField) -> Option<String> {
    let pattern = field.text_pattern();
    visible_text_nodes(doc.root_element()).find_map(|text| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

fn visible_text_nodes<'a>(root: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    root.descendants().filter_map(|node| {
        let text = node.value().as_text()?;
        let parent = node.parent()?;
        let hidden = parent
            .value()
            .as_element()
            .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript" | "template"));
        let trimmed = text.trim();
        if hidden || trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Rewrite a recognized date to canonical form; keep the input verbatim otherwise.
pub fn normalize_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(parsed) => format_canonical(&parsed),
        None => {
            engine_warn!("Could not standardize date: {}", raw);
            raw.to_string()
        }
    }
}

pub fn format_canonical(value: &NaiveDateTime) -> String {
    value.format(CANONICAL_TIMESTAMP_FORMAT).to_string()
}

/// Best-effort parse. Offsets are kept as wall-clock time in the stated zone.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    const WITH_OFFSET: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f%z",
        "%Y-%m-%dT%H:%M%:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%d %H:%M:%S %z",
    ];
    const NAIVE: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];
    const DATE_ONLY: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%B %d, %Y",
        "%b %d, %Y",
        "%B %d %Y",
        "%b %d %Y",
        "%d %B %Y",
        "%d %b %Y",
        "%m/%d/%Y",
    ];

    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    for fmt in WITH_OFFSET {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }
    for fmt in DATE_ONLY {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    // Natural formats; naive inputs are read as UTC so the wall time is not shifted.
    dateparser::parse_with_timezone(s, &Utc)
        .ok()
        .map(|dt| dt.naive_utc())
}

/// PDF info dates: `D:YYYYMMDDHHmmSS...` reduced to 14 digits. Unparsable yields `None`.
pub fn parse_pdf_date(raw: &str) -> Option<String> {
    let stripped = raw.replace("D:", "");
    let digits: String = stripped.chars().take(14).collect();
    NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M%S")
        .ok()
        .map(|parsed| format_canonical(&parsed))
}

/// Filesystem modification time in local wall-clock time.
pub fn canonical_from_system_time(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    format_canonical(&local.naive_local())
}
