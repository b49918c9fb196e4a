//! How a device buffer will be used by the kernel, and therefore whether
//! host data is copied in when the buffer is created.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BufferIntent {
    /// Kernel input; host contents are copied at creation.
    ReadOnlyInput,
    /// Kernel output; allocated uninitialized, read back after dispatch.
    WriteOnlyOutput,
    /// In/out; host contents are copied at creation.
    ReadWrite,
}

impl BufferIntent {
    /// Whether creation copies the host buffer to the device.
    pub fn copies_host_data(self) -> bool {
        !matches!(self, BufferIntent::WriteOnlyOutput)
    }

    pub fn kernel_reads(self) -> bool {
        !matches!(self, BufferIntent::WriteOnlyOutput)
    }

    pub fn kernel_writes(self) -> bool {
        !matches!(self, BufferIntent::ReadOnlyInput)
    }
}
