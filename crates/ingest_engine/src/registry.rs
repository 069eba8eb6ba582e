use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use engine_logging::{engine_info, engine_warn};
use ingest_core::ContentEntry;
use walkdir::WalkDir;

use crate::local::{extension_of, SUPPORTED_EXTENSIONS};

/// Malformed source table. Fatal: raised before any fetching starts.
#[derive(Debug, thiserror::Error)]
pub enum SourceLoadError {
    #[error("unsupported source table format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("failed to open workbook {path}: {message}")]
    Workbook { path: PathBuf, message: String },
    #[error("workbook {0} has no sheets")]
    NoSheet(PathBuf),
    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("source table needs at least two columns (content name, url), found {0}")]
    TooFewColumns(usize),
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load remote entries from the first sheet of a workbook or a CSV file.
///
/// The first row is a header. Column one is the content name, column two the
/// URL; further columns are ignored and rows with a blank URL are skipped.
pub fn load_table(path: &Path) -> Result<Vec<ContentEntry>, SourceLoadError> {
    let ext = extension_of(path);
    let rows = if ext == "csv" {
        csv_rows(path)?
    } else if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        workbook_rows(path)?
    } else {
        return Err(SourceLoadError::UnsupportedFormat(path.to_path_buf()));
    };

    let total_rows = rows.len();
    let entries: Vec<ContentEntry> = rows
        .into_iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .map(|(name, url)| ContentEntry::remote(name, url.trim()))
        .collect();
    engine_info!(
        "Loaded {} content entries from {} ({} blank rows skipped)",
        entries.len(),
        path.display(),
        total_rows - entries.len()
    );
    Ok(entries)
}

fn csv_rows(path: &Path) -> Result<Vec<(String, String)>, SourceLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let width = reader.headers()?.len();
    if width < 2 {
        return Err(SourceLoadError::TooFewColumns(width));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cell = |i: usize| record.get(i).unwrap_or_default().to_string();
        rows.push((cell(0), cell(1)));
    }
    Ok(rows)
}

fn workbook_rows(path: &Path) -> Result<Vec<(String, String)>, SourceLoadError> {
    let workbook_err = |message: String| SourceLoadError::Workbook {
        path: path.to_path_buf(),
        message,
    };
    let mut workbook = open_workbook_auto(path).map_err(|e| workbook_err(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SourceLoadError::NoSheet(path.to_path_buf()))?
        .map_err(|e| workbook_err(e.to_string()))?;

    if range.width() < 2 {
        return Err(SourceLoadError::TooFewColumns(range.width()));
    }
    Ok(range
        .rows()
        .skip(1)
        .map(|row| (cell_text(row.first()), cell_text(row.get(1))))
        .collect())
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(value) => value.to_string(),
    }
}

/// Recursively list files under `root` whose extension is supported, sorted by path.
///
/// A missing root yields an empty list and a warning.
pub fn scan_directory(root: &Path) -> Vec<ContentEntry> {
    if !root.is_dir() {
        engine_warn!("Local directory not found: {}", root.display());
        return Vec::new();
    }

    let entries: Vec<ContentEntry> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                engine_warn!("Skipping unreadable path under {}: {}", root.display(), err);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| SUPPORTED_EXTENSIONS.contains(&extension_of(entry.path()).as_str()))
        .map(|entry| {
            let stem = entry
                .path()
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            ContentEntry::local(stem, entry.path().to_string_lossy().into_owned())
        })
        .collect();
    engine_info!("Found {} local files under {}", entries.len(), root.display());
    entries
}
