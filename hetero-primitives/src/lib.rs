pub mod error;
pub mod hardware;
pub mod intent;
pub mod partition;
pub mod source;
pub mod timing;
pub mod verify;

#[cfg(feature = "opencl")]
pub mod buffer;
#[cfg(feature = "opencl")]
pub mod device;
#[cfg(feature = "opencl")]
pub mod program;
#[cfg(feature = "opencl")]
pub mod runner;

pub use error::{try_host_vec, ComputeError, PartitionError};
pub use hardware::{DeviceInfo, DeviceKind};
pub use intent::BufferIntent;
pub use partition::{round_up, WorkPartition};
pub use source::KernelSource;
pub use timing::{speedup, BenchTimer, Clock};
pub use verify::{verify_exact, verify_within, Mismatch, Verification, MATMUL_TOLERANCE};

#[cfg(feature = "opencl")]
pub use buffer::{BufferId, DeviceElement};
#[cfg(feature = "opencl")]
pub use device::{discover_device, DeviceHandle};
#[cfg(feature = "opencl")]
pub use runner::{DeviceRunner, Dispatch, HandleKind, KernelArg};

/// Whether this build can talk to OpenCL devices.
pub const DEVICE_SUPPORT: bool = cfg!(feature = "opencl");
