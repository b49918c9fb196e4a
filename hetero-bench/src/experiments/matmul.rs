//! Dense square matrix multiplication `C = A * B`.
//!
//! The device path uses a 2-D partition with 16x16 work-groups (smaller if
//! the device cannot hold 256 work-items per group); sizes that are not a
//! multiple of the group side are padded and the kernel bounds-checks.

use std::collections::HashMap;

use hetero_primitives::source::{MATRIX_MULTIPLY_ENTRY, MATRIX_MULTIPLY_FILE};
use hetero_primitives::verify::MATMUL_TOLERANCE;
use hetero_primitives::{
    try_host_vec, verify_within, BufferId, BufferIntent, Clock, ComputeError, DeviceInfo,
    DeviceKind, DeviceRunner, Dispatch, KernelSource, Verification, WorkPartition,
};

use crate::cpu_baselines::sequential;
use crate::data_gen::DataGenerator;
use crate::error::BenchError;

use super::{BenchContext, Executor, Experiment, PhaseTimes};

pub const DEFAULT_SIZE: usize = 512;
pub const TILE: usize = 16;

/// Largest square group side `<= TILE` whose area fits the device limit.
pub fn tile_side(max_work_group_size: usize) -> usize {
    let mut side = TILE;
    while side > 1 && side * side > max_work_group_size {
        side /= 2;
    }
    side
}

struct Session {
    runner: DeviceRunner,
    a: BufferId<f32>,
    b: BufferId<f32>,
    c: BufferId<f32>,
    partition: WorkPartition,
}

pub struct MatmulExperiment {
    a: Vec<f32>,
    b: Vec<f32>,
    device_out: Vec<f32>,
    host_out: Vec<f32>,
    n: usize,
    device: Option<DeviceInfo>,
    session: Option<Session>,
}

impl MatmulExperiment {
    pub fn new() -> Self {
        Self {
            a: Vec::new(),
            b: Vec::new(),
            device_out: Vec::new(),
            host_out: Vec::new(),
            n: 0,
            device: None,
            session: None,
        }
    }
}

impl Experiment for MatmulExperiment {
    fn name(&self) -> &str {
        "matmul"
    }

    fn description(&self) -> &str {
        "Square f32 matrix multiply, 16x16 work-groups (OpenCL kernel vs triple loop)"
    }

    fn default_sizes(&self) -> Vec<usize> {
        vec![DEFAULT_SIZE]
    }

    fn input_bytes(&self, size: usize) -> usize {
        2 * size * size * std::mem::size_of::<f32>()
    }

    fn setup(
        &mut self,
        ctx: &BenchContext,
        size: usize,
        gen: &mut DataGenerator,
    ) -> Result<(), BenchError> {
        self.teardown();

        let n = size;
        let elems = n.checked_mul(n).ok_or(ComputeError::HostAllocation {
            elements: usize::MAX,
        })?;
        self.n = n;
        self.a = gen.matrix_f32(elems)?;
        self.b = gen.matrix_f32(elems)?;
        self.device_out = try_host_vec(elems, 0.0)?;
        self.host_out = try_host_vec(elems, 0.0)?;

        let mut runner = DeviceRunner::open(ctx.clock, DeviceKind::Gpu, Some(DeviceKind::Cpu))?;
        let info = runner.info().clone();

        let source = KernelSource::load_from(&ctx.kernel_dir, MATRIX_MULTIPLY_FILE)?;
        runner.build_program(&source)?;

        let a = runner.upload(&self.a, BufferIntent::ReadOnlyInput)?;
        let b = runner.upload(&self.b, BufferIntent::ReadOnlyInput)?;
        let c = runner.upload(&self.device_out, BufferIntent::WriteOnlyOutput)?;

        let side = tile_side(info.max_work_group_size);
        if side != TILE {
            tracing::warn!(
                side,
                max = info.max_work_group_size,
                "device work-group limit below 16x16, using smaller tiles"
            );
        }
        let partition = WorkPartition::grid([n, n], [side, side]).map_err(ComputeError::from)?;
        if partition.is_padded() {
            tracing::info!(
                logical = n,
                global = %partition.describe_global(),
                "global extent padded to a multiple of the work-group"
            );
        }

        self.device = Some(info);
        self.session = Some(Session {
            runner,
            a,
            b,
            c,
            partition,
        });
        Ok(())
    }

    fn run_sequential(&mut self, clock: Clock) -> f64 {
        let n = self.n;
        let timer = clock.timer();
        sequential::matmul(&self.a, &self.b, &mut self.host_out, n, n, n);
        timer.stop()
    }

    fn run_parallel(&mut self, _clock: Clock) -> Result<PhaseTimes, BenchError> {
        let s = self
            .session
            .as_mut()
            .ok_or_else(|| BenchError::NotSetUp("matmul".to_string()))?;
        let dim = self.n as i32;

        let launch = Dispatch::new(MATRIX_MULTIPLY_ENTRY, &s.partition, s.c)
            .arg(s.a)
            .arg(s.b)
            .arg(s.c)
            .arg(dim)
            .arg(dim)
            .arg(dim);
        let compute_ms = s.runner.dispatch(&launch)?;
        let transfer_ms = s.runner.download(s.c, &mut self.device_out)?;

        Ok(PhaseTimes {
            compute_ms,
            transfer_ms: Some(transfer_ms),
        })
    }

    fn validate(&self) -> Verification {
        verify_within(&self.device_out, &self.host_out, MATMUL_TOLERANCE)
    }

    fn executor(&self) -> Executor {
        match &self.device {
            Some(info) => Executor::Device(info.clone()),
            None => Executor::host_pool(),
        }
    }

    fn samples(&self) -> Vec<String> {
        let cols = self.n.min(5).min(self.device_out.len());
        (0..cols)
            .map(|j| {
                format!(
                    "C[0][{j}]: device={:.4}, host={:.4}",
                    self.device_out[j], self.host_out[j]
                )
            })
            .collect()
    }

    fn metrics(&self, compute_ms: f64, size: usize) -> HashMap<String, f64> {
        let mut m = HashMap::new();
        if compute_ms > 0.0 {
            let flops = 2.0 * (size as f64).powi(3);
            m.insert("gflops".to_string(), flops / (compute_ms * 1e6));
        }
        m
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            let released = session.runner.release_all();
            tracing::debug!(benchmark = "matmul", ?released, "device handles released");
        }
    }
}
