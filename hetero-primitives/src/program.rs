//! Program compilation and the per-entry-point kernel cache.

use opencl3::context::Context;
use opencl3::kernel::Kernel;
use opencl3::program::Program;
use opencl3::types::cl_device_id;

use crate::error::ComputeError;
use crate::source::KernelSource;

/// Compile `source` for one device.
///
/// On failure the device compiler's log is fetched and returned verbatim
/// inside [`ComputeError::Build`].
pub fn build_program(
    context: &Context,
    device: cl_device_id,
    source: &KernelSource,
    options: &str,
) -> Result<Program, ComputeError> {
    let mut program = Program::create_from_source(context, source.text())
        .map_err(|e| ComputeError::ProgramCreate { status: e.0 })?;

    if let Err(e) = program.build(&[device], options) {
        let log = program.get_build_log(device).unwrap_or_default();
        tracing::error!(
            path = %source.path().display(),
            status = e.0,
            "program build failed"
        );
        return Err(ComputeError::Build { status: e.0, log });
    }

    tracing::debug!(path = %source.path().display(), "program built");
    Ok(program)
}

/// Kernels created from the current program, keyed by entry-point name.
///
/// Kept in creation order so teardown can release them newest first.
#[derive(Default)]
pub struct KernelCache {
    kernels: Vec<(String, Kernel)>,
}

impl KernelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the kernel for `entry`, creating it from `program` on first use.
    pub fn get_or_create(&mut self, program: &Program, entry: &str) -> Result<&Kernel, ComputeError> {
        let idx = match self.kernels.iter().position(|(name, _)| name == entry) {
            Some(idx) => idx,
            None => {
                let kernel = Kernel::create(program, entry).map_err(|e| ComputeError::KernelCreate {
                    name: entry.to_string(),
                    status: e.0,
                })?;
                tracing::debug!(entry, "kernel created");
                self.kernels.push((entry.to_string(), kernel));
                self.kernels.len() - 1
            }
        };
        Ok(&self.kernels[idx].1)
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.kernels.iter().any(|(name, _)| name == entry)
    }

    /// Remove the most recently created kernel.
    pub fn pop(&mut self) -> Option<(String, Kernel)> {
        self.kernels.pop()
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}
