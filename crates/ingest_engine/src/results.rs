use std::path::{Path, PathBuf};

use engine_logging::engine_info;
use ingest_core::BatchResult;

use crate::persist::{AtomicFileWriter, PersistError};

/// Default name of the batch artifact inside the output directory.
pub const RESULTS_FILENAME: &str = "scraped_results.json";

/// Serialize every batch result as one pretty-printed JSON array (2-space
/// indent, declaration field order) and replace any prior artifact.
///
/// Date fields are typed as strings already, so no coercion pass is needed.
pub fn write_results(
    output_dir: &Path,
    filename: &str,
    results: &[BatchResult],
) -> Result<PathBuf, PersistError> {
    engine_info!("Preparing to save {} results to JSON file", results.len());
    let mut json = serde_json::to_string_pretty(results)?;
    json.push('\n');
    let path = AtomicFileWriter::new(output_dir.to_path_buf()).write(filename, &json)?;
    engine_info!("Successfully saved results to JSON file: {}", path.display());
    Ok(path)
}
