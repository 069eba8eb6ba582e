use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::filename::generated_filename;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Atomically write content to `{dir}/{filename}` by writing a temp file then renaming.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &str) -> Result<PathBuf, PersistError> {
        self.write_bytes(filename, content.as_bytes())
    }

    pub fn write_bytes(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_output_dir(&self.dir)?;

        let target = self.dir.join(filename);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(content)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // A prior artifact is replaced wholesale, never merged.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}

/// A raw original saved under a generated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub filename: String,
}

impl SavedFile {
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// The `html/` and `pdf/` directories holding saved originals.
#[derive(Debug, Clone)]
pub struct RawContentStore {
    html_dir: PathBuf,
    pdf_dir: PathBuf,
}

impl RawContentStore {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            html_dir: output_dir.join("html"),
            pdf_dir: output_dir.join("pdf"),
        }
    }

    /// Create both directories up front.
    pub fn prepare(&self) -> Result<(), PersistError> {
        ensure_output_dir(&self.html_dir)?;
        ensure_output_dir(&self.pdf_dir)
    }

    pub fn html_dir(&self) -> &Path {
        &self.html_dir
    }

    pub fn pdf_dir(&self) -> &Path {
        &self.pdf_dir
    }

    pub fn save_html(&self, content_name: &str, html: &str) -> Result<SavedFile, PersistError> {
        save(&self.html_dir, content_name, "html", html.as_bytes())
    }

    pub fn save_pdf(&self, content_name: &str, bytes: &[u8]) -> Result<SavedFile, PersistError> {
        save(&self.pdf_dir, content_name, "pdf", bytes)
    }
}

fn save(dir: &Path, content_name: &str, ext: &str, bytes: &[u8]) -> Result<SavedFile, PersistError> {
    let filename = generated_filename(content_name, ext);
    let path = AtomicFileWriter::new(dir.to_path_buf()).write_bytes(&filename, bytes)?;
    engine_info!("Saved {} content to: {}", ext.to_ascii_uppercase(), path.display());
    Ok(SavedFile { path, filename })
}
