//! Benchmark trait and registry.
//!
//! Each benchmark pairs a sequential host baseline with one parallel path:
//! an OpenCL kernel on a device, or the rayon host pool.

#[cfg(feature = "opencl")]
pub mod matmul;
pub mod minmax;
pub mod selection_sort;
#[cfg(feature = "opencl")]
pub mod vector_add;

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use hetero_primitives::{Clock, DeviceInfo, Verification};

use crate::data_gen::DataGenerator;
use crate::error::BenchError;

/// Benchmarks that dispatch OpenCL kernels.
pub const DEVICE_BENCHMARKS: [&str; 2] = ["vector-add", "matmul"];
/// Benchmarks that run on the host pool.
pub const HOST_BENCHMARKS: [&str; 2] = ["minmax", "selection-sort"];

/// Shared, read-only state handed to every benchmark.
pub struct BenchContext {
    pub clock: Clock,
    pub kernel_dir: PathBuf,
}

/// What ran the parallel path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "executor", rename_all = "kebab-case")]
pub enum Executor {
    Device(DeviceInfo),
    HostPool { threads: usize },
}

impl Executor {
    pub fn host_pool() -> Self {
        Executor::HostPool {
            threads: rayon::current_num_threads(),
        }
    }

    pub fn device(&self) -> Option<&DeviceInfo> {
        match self {
            Executor::Device(info) => Some(info),
            Executor::HostPool { .. } => None,
        }
    }
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Executor::Device(info) => write!(f, "{}", info.label()),
            Executor::HostPool { threads } => write!(f, "rayon pool ({threads} threads)"),
        }
    }
}

/// Timings of one parallel run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseTimes {
    /// Kernel (device) or pool (host) time in ms.
    pub compute_ms: f64,
    /// Device-to-host readback in ms; `None` on the host pool.
    pub transfer_ms: Option<f64>,
}

impl PhaseTimes {
    pub fn host(compute_ms: f64) -> Self {
        Self {
            compute_ms,
            transfer_ms: None,
        }
    }
}

pub trait Experiment {
    /// Name used for CLI selection (e.g. "matmul").
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Sizes run when `--sizes` is not given.
    fn default_sizes(&self) -> Vec<usize>;

    /// Bytes of input data at `size`, for the report.
    fn input_bytes(&self, size: usize) -> usize;

    /// Generate inputs and acquire whatever the parallel path needs.
    fn setup(
        &mut self,
        ctx: &BenchContext,
        size: usize,
        gen: &mut DataGenerator,
    ) -> Result<(), BenchError>;

    /// Run the sequential baseline. Returns elapsed ms.
    fn run_sequential(&mut self, clock: Clock) -> f64;

    /// Run the parallel path.
    fn run_parallel(&mut self, clock: Clock) -> Result<PhaseTimes, BenchError>;

    /// Compare the last parallel result against the last sequential one.
    fn validate(&self) -> Verification;

    fn executor(&self) -> Executor;

    /// A few result values for the console report.
    fn samples(&self) -> Vec<String>;

    /// Throughput figures for one parallel compute time.
    fn metrics(&self, _compute_ms: f64, _size: usize) -> HashMap<String, f64> {
        HashMap::new()
    }

    /// Release per-size resources. Called after every size.
    fn teardown(&mut self) {}
}

/// Every benchmark this build can run, in report order.
pub fn all_experiments() -> Vec<Box<dyn Experiment>> {
    #[allow(unused_mut)]
    let mut all: Vec<Box<dyn Experiment>> = Vec::new();
    #[cfg(feature = "opencl")]
    {
        all.push(Box::new(vector_add::VectorAddExperiment::new()));
        all.push(Box::new(matmul::MatmulExperiment::new()));
    }
    all.push(Box::new(minmax::MinMaxExperiment::new()));
    all.push(Box::new(selection_sort::SelectionSortExperiment::new()));
    all
}

/// Resolve CLI names into benchmarks, preserving the order given.
///
/// `all` selects everything this build supports. Naming a device benchmark
/// in a build without OpenCL support is an error.
pub fn select(names: &[String], all_suite: bool) -> Result<Vec<Box<dyn Experiment>>, BenchError> {
    let mut available = all_experiments();
    if all_suite {
        return Ok(available);
    }

    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let wanted = name.to_ascii_lowercase();
        if let Some(idx) = available.iter().position(|e| e.name() == wanted) {
            selected.push(available.remove(idx));
        } else if selected.iter().any(|e: &Box<dyn Experiment>| e.name() == wanted) {
            tracing::warn!(benchmark = %wanted, "benchmark named twice, running once");
        } else if DEVICE_BENCHMARKS.contains(&wanted.as_str()) {
            return Err(BenchError::DeviceSupportDisabled(wanted));
        } else {
            return Err(BenchError::UnknownBenchmark {
                name: name.clone(),
                available: DEVICE_BENCHMARKS
                    .iter()
                    .chain(HOST_BENCHMARKS.iter())
                    .copied()
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }
    }
    Ok(selected)
}
