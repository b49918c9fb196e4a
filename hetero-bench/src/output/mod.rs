//! Result rendering: per-benchmark console report, comfy-table summary,
//! JSON and CSV files, and the progress spinner.

pub mod csv;
pub mod json;
pub mod progress;
pub mod report;
pub mod table;

use std::fs;
use std::path::Path;

use crate::error::BenchError;

/// Create the parent directory of `path` if it has one.
fn ensure_parent(path: &str) -> Result<(), BenchError> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| BenchError::Output {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }
    Ok(())
}
