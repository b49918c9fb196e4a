//! The device compute runner.
//!
//! A [`DeviceRunner`] owns every OpenCL handle it acquires: context,
//! command queue, program, kernels and buffers. Host buffers stay with the
//! caller and are only borrowed for upload and readback. Acquisitions are
//! logged in order; teardown walks that log backwards, either eagerly via
//! [`DeviceRunner::release_all`] or from `Drop` on any early return.

use std::ptr;

use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::program::Program;
use opencl3::types::{cl_int, cl_mem, CL_BLOCKING};

use crate::buffer::{self, BufferId, DeviceElement, DeviceMemory};
use crate::device::{discover_device, DeviceHandle};
use crate::error::ComputeError;
use crate::hardware::{DeviceInfo, DeviceKind};
use crate::intent::BufferIntent;
use crate::partition::WorkPartition;
use crate::program::{build_program, KernelCache};
use crate::source::KernelSource;
use crate::timing::Clock;

/// One device-side handle, as recorded in the acquisition log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleKind {
    Context,
    Queue,
    Program,
    Kernel(String),
    Buffer(usize),
}

/// Positional kernel argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelArg {
    /// A runner-owned buffer, by slot.
    Buffer(usize),
    Int(i32),
}

impl<T> From<BufferId<T>> for KernelArg {
    fn from(id: BufferId<T>) -> Self {
        KernelArg::Buffer(id.slot)
    }
}

impl From<i32> for KernelArg {
    fn from(v: i32) -> Self {
        KernelArg::Int(v)
    }
}

/// A kernel launch: entry point, partition and positional arguments.
///
/// `driver_len` is the element count of the host buffer the result lands
/// in; it must match the partition's logical extent.
#[derive(Debug, Clone)]
pub struct Dispatch<'a> {
    entry: &'a str,
    partition: &'a WorkPartition,
    driver_len: usize,
    args: Vec<KernelArg>,
}

impl<'a> Dispatch<'a> {
    pub fn new<T>(entry: &'a str, partition: &'a WorkPartition, output: BufferId<T>) -> Self {
        Self {
            entry,
            partition,
            driver_len: output.len(),
            args: Vec::new(),
        }
    }

    /// Append the next positional argument.
    pub fn arg(mut self, arg: impl Into<KernelArg>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn entry(&self) -> &str {
        self.entry
    }

    pub fn args(&self) -> &[KernelArg] {
        &self.args
    }
}

pub struct DeviceRunner {
    clock: Clock,
    device: DeviceHandle,
    context: Option<Context>,
    queue: Option<CommandQueue>,
    program: Option<Program>,
    kernels: KernelCache,
    buffers: Vec<Option<DeviceMemory>>,
    acquired: Vec<HandleKind>,
}

impl DeviceRunner {
    /// Discover a device and open a runner on it.
    pub fn open(
        clock: Clock,
        preferred: DeviceKind,
        fallback: Option<DeviceKind>,
    ) -> Result<Self, ComputeError> {
        let device = discover_device(preferred, fallback)?;
        Self::new(clock, device)
    }

    /// Create a context and an in-order command queue on `device`.
    pub fn new(clock: Clock, device: DeviceHandle) -> Result<Self, ComputeError> {
        let mut runner = Self {
            clock,
            device,
            context: None,
            queue: None,
            program: None,
            kernels: KernelCache::new(),
            buffers: Vec::new(),
            acquired: Vec::new(),
        };

        let context = Context::from_device(runner.device.device())
            .map_err(|e| ComputeError::Context { status: e.0 })?;
        runner.context = Some(context);
        runner.acquired.push(HandleKind::Context);

        let context = runner.context()?;
        // clCreateCommandQueue is the 1.2 entry point; the 2.0 one is not
        // available everywhere.
        #[allow(deprecated)]
        let queue = CommandQueue::create_default(context, 0)
            .map_err(|e| ComputeError::Queue { status: e.0 })?;
        runner.queue = Some(queue);
        runner.acquired.push(HandleKind::Queue);

        Ok(runner)
    }

    pub fn info(&self) -> &DeviceInfo {
        self.device.info()
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    fn context(&self) -> Result<&Context, ComputeError> {
        // Both are only None after teardown, which consumes the runner.
        self.context.as_ref().ok_or(ComputeError::Context {
            status: opencl3::error_codes::CL_INVALID_CONTEXT,
        })
    }

    fn queue(&self) -> Result<&CommandQueue, ComputeError> {
        self.queue.as_ref().ok_or(ComputeError::Queue {
            status: opencl3::error_codes::CL_INVALID_COMMAND_QUEUE,
        })
    }

    /// Compile `source` for this runner's device.
    ///
    /// A previously built program is released first, along with any kernels
    /// created from it.
    pub fn build_program(&mut self, source: &KernelSource) -> Result<(), ComputeError> {
        if self.program.is_some() {
            self.release_program();
        }
        let program = build_program(self.context()?, self.device.id(), source, "")?;
        self.program = Some(program);
        self.acquired.push(HandleKind::Program);
        Ok(())
    }

    fn release_program(&mut self) {
        while let Some((name, kernel)) = self.kernels.pop() {
            drop(kernel);
            self.acquired.retain(|h| *h != HandleKind::Kernel(name.clone()));
        }
        self.program = None;
        self.acquired.retain(|h| *h != HandleKind::Program);
    }

    /// Allocate a device buffer mirroring `host`.
    ///
    /// Input intents copy `host` at creation; `WriteOnlyOutput` only takes
    /// its length.
    pub fn upload<T: DeviceElement>(
        &mut self,
        host: &[T],
        intent: BufferIntent,
    ) -> Result<BufferId<T>, ComputeError> {
        let memory = buffer::create(self.context()?, intent, Some(host), host.len())?;
        let slot = self.buffers.len();
        self.buffers.push(Some(memory));
        self.acquired.push(HandleKind::Buffer(slot));
        Ok(BufferId::new(slot, host.len(), intent))
    }

    fn raw_buffer(&self, slot: usize) -> Result<cl_mem, ComputeError> {
        self.buffers
            .get(slot)
            .and_then(Option::as_ref)
            .map(DeviceMemory::raw)
            .ok_or(ComputeError::UnknownBuffer(slot))
    }

    /// Bind arguments, enqueue over the partition and block until the queue
    /// drains. Returns kernel time in milliseconds.
    pub fn dispatch(&mut self, launch: &Dispatch<'_>) -> Result<f64, ComputeError> {
        let partition = launch.partition;
        partition.validate_for_device(self.device.info().max_work_group_size)?;
        partition.check_host_len(launch.driver_len)?;

        let mut raws: Vec<Option<cl_mem>> = Vec::with_capacity(launch.args.len());
        for arg in &launch.args {
            raws.push(match *arg {
                KernelArg::Buffer(slot) => Some(self.raw_buffer(slot)?),
                KernelArg::Int(_) => None,
            });
        }

        let program = self.program.as_ref().ok_or(ComputeError::NoProgram)?;
        let fresh = !self.kernels.contains(launch.entry);
        let kernel = self.kernels.get_or_create(program, launch.entry)?;
        if fresh {
            self.acquired.push(HandleKind::Kernel(launch.entry.to_string()));
        }

        for (index, (arg, raw)) in launch.args.iter().zip(&raws).enumerate() {
            let index = index as u32;
            let set = match (arg, raw) {
                (_, Some(mem)) => unsafe { kernel.set_arg(index, mem) },
                (KernelArg::Int(v), None) => {
                    let v: cl_int = *v;
                    unsafe { kernel.set_arg(index, &v) }
                }
                (KernelArg::Buffer(slot), None) => return Err(ComputeError::UnknownBuffer(*slot)),
            };
            set.map_err(|e| ComputeError::SetArg {
                kernel: launch.entry.to_string(),
                index,
                status: e.0,
            })?;
        }

        let queue = self.queue.as_ref().ok_or(ComputeError::Queue {
            status: opencl3::error_codes::CL_INVALID_COMMAND_QUEUE,
        })?;
        let global = partition.global();
        let local_ptr = partition.local().map_or(ptr::null(), |l| l.as_ptr());

        tracing::debug!(
            entry = launch.entry,
            global = %partition.describe_global(),
            local = %partition.describe_local(),
            "dispatch"
        );
        let timer = self.clock.timer();
        let event = unsafe {
            queue.enqueue_nd_range_kernel(
                kernel.get(),
                partition.dims() as u32,
                ptr::null(),
                global.as_ptr(),
                local_ptr,
                &[],
            )
        }
        .map_err(|e| ComputeError::Dispatch {
            kernel: launch.entry.to_string(),
            status: e.0,
        })?;
        queue
            .finish()
            .map_err(|e| ComputeError::Finish { status: e.0 })?;
        let ms = timer.stop();
        drop(event);
        Ok(ms)
    }

    /// Blocking copy of a device buffer into `host`. Returns transfer time
    /// in milliseconds.
    pub fn download<T: DeviceElement>(
        &self,
        id: BufferId<T>,
        host: &mut [T],
    ) -> Result<f64, ComputeError> {
        if host.len() != id.len() {
            return Err(ComputeError::ExtentMismatch {
                host: host.len(),
                partition: id.len(),
            });
        }
        let memory = self
            .buffers
            .get(id.slot)
            .and_then(Option::as_ref)
            .and_then(T::view)
            .ok_or(ComputeError::UnknownBuffer(id.slot))?;
        let queue = self.queue()?;

        let timer = self.clock.timer();
        unsafe { queue.enqueue_read_buffer(memory, CL_BLOCKING, 0, host, &[]) }
            .map_err(|e| ComputeError::Readback { status: e.0 })?;
        Ok(timer.stop())
    }

    /// Release every handle now, newest first, and report the order.
    pub fn release_all(mut self) -> Vec<HandleKind> {
        self.teardown()
    }

    fn teardown(&mut self) -> Vec<HandleKind> {
        let mut released = Vec::with_capacity(self.acquired.len());
        while let Some(handle) = self.acquired.pop() {
            match &handle {
                HandleKind::Buffer(slot) => {
                    if let Some(entry) = self.buffers.get_mut(*slot) {
                        drop(entry.take());
                    }
                }
                // Kernels are logged in cache order, so popping the cache
                // matches the reverse walk.
                HandleKind::Kernel(_) => drop(self.kernels.pop()),
                HandleKind::Program => drop(self.program.take()),
                HandleKind::Queue => drop(self.queue.take()),
                HandleKind::Context => drop(self.context.take()),
            }
            tracing::trace!(?handle, "released");
            released.push(handle);
        }
        released
    }
}

impl Drop for DeviceRunner {
    fn drop(&mut self) {
        self.teardown();
    }
}
