//! Kernel sources are plain text files read at run time, never embedded
//! in the binary, so they stay editable between runs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ComputeError;

/// File name of the elementwise vector addition kernel.
pub const VECTOR_ADD_FILE: &str = "vector_add.cl";
/// Entry point inside [`VECTOR_ADD_FILE`].
pub const VECTOR_ADD_ENTRY: &str = "vector_add";

/// File name of the dense matrix multiplication kernel.
pub const MATRIX_MULTIPLY_FILE: &str = "matrix_multiply.cl";
/// Entry point inside [`MATRIX_MULTIPLY_FILE`].
pub const MATRIX_MULTIPLY_ENTRY: &str = "matrix_multiply";

/// One compilation unit of kernel source text.
#[derive(Debug, Clone)]
pub struct KernelSource {
    path: PathBuf,
    text: String,
}

impl KernelSource {
    /// Read the whole file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ComputeError> {
        let path = path.as_ref().to_path_buf();
        let text = fs::read_to_string(&path).map_err(|source| ComputeError::KernelSource {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), bytes = text.len(), "kernel source loaded");
        Ok(Self { path, text })
    }

    /// Read `file_name` from `dir`.
    pub fn load_from(dir: impl AsRef<Path>, file_name: &str) -> Result<Self, ComputeError> {
        Self::load(dir.as_ref().join(file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}
