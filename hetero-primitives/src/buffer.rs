//! Device buffers and the typed handles the runner hands out for them.

use std::ffi::c_void;
use std::marker::PhantomData;
use std::ptr;

use opencl3::context::Context;
use opencl3::memory::{
    Buffer, ClMem, CL_MEM_COPY_HOST_PTR, CL_MEM_READ_ONLY, CL_MEM_READ_WRITE, CL_MEM_WRITE_ONLY,
};
use opencl3::types::{cl_mem, cl_mem_flags};

use crate::error::ComputeError;
use crate::intent::BufferIntent;

/// OpenCL allocation flags for a usage intent.
pub fn mem_flags(intent: BufferIntent) -> cl_mem_flags {
    match intent {
        BufferIntent::ReadOnlyInput => CL_MEM_READ_ONLY | CL_MEM_COPY_HOST_PTR,
        BufferIntent::WriteOnlyOutput => CL_MEM_WRITE_ONLY,
        BufferIntent::ReadWrite => CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR,
    }
}

/// A device allocation of one of the supported element types.
pub enum DeviceMemory {
    F32(Buffer<f32>),
    I32(Buffer<i32>),
}

impl DeviceMemory {
    /// Raw handle for `clSetKernelArg`.
    pub fn raw(&self) -> cl_mem {
        match self {
            DeviceMemory::F32(b) => b.get(),
            DeviceMemory::I32(b) => b.get(),
        }
    }
}

/// Element types that can live in a [`DeviceMemory`].
pub trait DeviceElement: Copy + Default + Send + 'static {
    fn wrap(buffer: Buffer<Self>) -> DeviceMemory;
    fn view(memory: &DeviceMemory) -> Option<&Buffer<Self>>;
}

impl DeviceElement for f32 {
    fn wrap(buffer: Buffer<Self>) -> DeviceMemory {
        DeviceMemory::F32(buffer)
    }

    fn view(memory: &DeviceMemory) -> Option<&Buffer<Self>> {
        match memory {
            DeviceMemory::F32(b) => Some(b),
            _ => None,
        }
    }
}

impl DeviceElement for i32 {
    fn wrap(buffer: Buffer<Self>) -> DeviceMemory {
        DeviceMemory::I32(buffer)
    }

    fn view(memory: &DeviceMemory) -> Option<&Buffer<Self>> {
        match memory {
            DeviceMemory::I32(b) => Some(b),
            _ => None,
        }
    }
}

/// Typed handle to a buffer owned by a runner.
///
/// The handle is only an index; the runner keeps the allocation and
/// releases it at teardown.
#[derive(Debug)]
pub struct BufferId<T> {
    pub(crate) slot: usize,
    len: usize,
    intent: BufferIntent,
    _elem: PhantomData<T>,
}

// Manual impls: `T` itself need not be Clone/Copy.
impl<T> Clone for BufferId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BufferId<T> {}

impl<T> BufferId<T> {
    pub(crate) fn new(slot: usize, len: usize, intent: BufferIntent) -> Self {
        Self {
            slot,
            len,
            intent,
            _elem: PhantomData,
        }
    }

    /// Element count.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn intent(&self) -> BufferIntent {
        self.intent
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Allocate a device buffer of `len` elements.
///
/// Intents that copy host data read `len` elements from `host`, which the
/// caller has already checked is long enough.
pub(crate) fn create<T: DeviceElement>(
    context: &Context,
    intent: BufferIntent,
    host: Option<&[T]>,
    len: usize,
) -> Result<DeviceMemory, ComputeError> {
    let bytes = len * std::mem::size_of::<T>();
    let host_ptr = match (intent.copies_host_data(), host) {
        // The driver only reads through this pointer when COPY_HOST_PTR is set.
        (true, Some(data)) => data.as_ptr() as *mut c_void,
        _ => ptr::null_mut(),
    };
    let buffer = unsafe { Buffer::<T>::create(context, mem_flags(intent), len, host_ptr) }
        .map_err(|e| ComputeError::BufferCreate {
            bytes,
            status: e.0,
        })?;
    tracing::trace!(bytes, ?intent, "device buffer created");
    Ok(T::wrap(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_flags_copy_host_data() {
        assert_ne!(mem_flags(BufferIntent::ReadOnlyInput) & CL_MEM_COPY_HOST_PTR, 0);
        assert_ne!(mem_flags(BufferIntent::ReadOnlyInput) & CL_MEM_READ_ONLY, 0);
        assert_eq!(mem_flags(BufferIntent::WriteOnlyOutput), CL_MEM_WRITE_ONLY);
        assert_ne!(mem_flags(BufferIntent::ReadWrite) & CL_MEM_READ_WRITE, 0);
    }

    #[test]
    fn test_buffer_id_is_copy() {
        let id: BufferId<f32> = BufferId::new(3, 1024, BufferIntent::WriteOnlyOutput);
        let copy = id;
        assert_eq!(id.slot(), copy.slot());
        assert_eq!(copy.len(), 1024);
        assert_eq!(copy.intent(), BufferIntent::WriteOnlyOutput);
    }
}
