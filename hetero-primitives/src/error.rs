//! Error taxonomy for device compute runs.
//!
//! Every OpenCL call site maps its non-success status into one variant
//! named after the phase that failed. Only a failed program build carries
//! a diagnostic payload (the compiler log); everything else carries the
//! raw numeric status.

use std::path::PathBuf;

/// `CL_PLATFORM_NOT_FOUND_KHR`, reported when the ICD loader lists no platform.
pub const STATUS_PLATFORM_NOT_FOUND: i32 = -1001;

/// `CL_DEVICE_NOT_FOUND`, reported when a platform has no device of a class.
pub const STATUS_DEVICE_NOT_FOUND: i32 = -1;

/// Work-partition validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PartitionError {
    #[error("unsupported dimension count {0} (expected 1 or 2)")]
    Dimensions(usize),
    #[error("local extent has {local} dimensions but global has {global}")]
    DimensionMismatch { global: usize, local: usize },
    #[error("global extent is zero in dimension {dim}")]
    ZeroExtent { dim: usize },
    #[error("local extent is zero in dimension {dim}")]
    ZeroLocal { dim: usize },
    #[error("global extent {global} is not a multiple of local extent {local} in dimension {dim}")]
    NotMultiple { dim: usize, global: usize, local: usize },
    #[error("work-group of {size} items exceeds device limit of {max}")]
    GroupTooLarge { size: usize, max: usize },
}

/// Fatal failure of one phase of a device compute run.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    #[error("platform discovery failed: status {status}")]
    NoPlatform { status: i32 },

    #[error("no GPU or CPU device on platform '{platform}': status {status}")]
    NoDevice { platform: String, status: i32 },

    #[error("context creation failed: status {status}")]
    Context { status: i32 },

    #[error("command queue creation failed: status {status}")]
    Queue { status: i32 },

    #[error("cannot read kernel source {}: {source}", path.display())]
    KernelSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("program creation failed: status {status}")]
    ProgramCreate { status: i32 },

    #[error("program build failed: status {status}\nbuild log:\n{log}")]
    Build { status: i32, log: String },

    #[error("kernel '{name}' creation failed: status {status}")]
    KernelCreate { name: String, status: i32 },

    #[error("device buffer allocation of {bytes} bytes failed: status {status}")]
    BufferCreate { bytes: usize, status: i32 },

    #[error("host allocation of {elements} elements failed")]
    HostAllocation { elements: usize },

    #[error("setting argument {index} of kernel '{kernel}' failed: status {status}")]
    SetArg {
        kernel: String,
        index: u32,
        status: i32,
    },

    #[error("kernel '{kernel}' dispatch failed: status {status}")]
    Dispatch { kernel: String, status: i32 },

    #[error("queue synchronization failed: status {status}")]
    Finish { status: i32 },

    #[error("device-to-host readback failed: status {status}")]
    Readback { status: i32 },

    #[error("invalid work partition: {0}")]
    InvalidPartition(#[from] PartitionError),

    #[error("host buffer holds {host} elements but the partition covers {partition}")]
    ExtentMismatch { host: usize, partition: usize },

    #[error("unknown device buffer handle #{0}")]
    UnknownBuffer(usize),

    #[error("dispatch requested before a program was built")]
    NoProgram,
}

impl ComputeError {
    /// Short name of the phase that failed, used in console diagnostics.
    pub fn phase(&self) -> &'static str {
        match self {
            ComputeError::NoPlatform { .. } => "platform",
            ComputeError::NoDevice { .. } => "device",
            ComputeError::Context { .. } => "context",
            ComputeError::Queue { .. } => "queue",
            ComputeError::KernelSource { .. } => "kernel source",
            ComputeError::ProgramCreate { .. } => "program",
            ComputeError::Build { .. } => "build",
            ComputeError::KernelCreate { .. } => "kernel",
            ComputeError::BufferCreate { .. } | ComputeError::HostAllocation { .. } => "allocation",
            ComputeError::SetArg { .. } => "kernel arguments",
            ComputeError::Dispatch { .. } | ComputeError::Finish { .. } => "dispatch",
            ComputeError::Readback { .. } => "readback",
            ComputeError::InvalidPartition(_)
            | ComputeError::ExtentMismatch { .. }
            | ComputeError::UnknownBuffer(_)
            | ComputeError::NoProgram => "precondition",
        }
    }

    /// Numeric OpenCL status, when the failure came from an API call.
    pub fn status(&self) -> Option<i32> {
        match self {
            ComputeError::NoPlatform { status }
            | ComputeError::NoDevice { status, .. }
            | ComputeError::Context { status }
            | ComputeError::Queue { status }
            | ComputeError::ProgramCreate { status }
            | ComputeError::Build { status, .. }
            | ComputeError::KernelCreate { status, .. }
            | ComputeError::BufferCreate { status, .. }
            | ComputeError::SetArg { status, .. }
            | ComputeError::Dispatch { status, .. }
            | ComputeError::Finish { status }
            | ComputeError::Readback { status } => Some(*status),
            _ => None,
        }
    }
}

/// Reserve exactly `len` elements on the host, mapping allocator failure
/// into [`ComputeError::HostAllocation`].
pub fn try_host_vec<T: Clone>(len: usize, fill: T) -> Result<Vec<T>, ComputeError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| ComputeError::HostAllocation { elements: len })?;
    v.resize(len, fill);
    Ok(v)
}
