//! Vector addition: `c[i] = a[i] + b[i]` with `a[i] = i`, `b[i] = 2i`.
//!
//! The device path dispatches one work-item per element over a 1-D
//! partition and lets the driver choose the group size. The result must
//! match the host loop exactly.

use std::collections::HashMap;

use hetero_primitives::source::{VECTOR_ADD_ENTRY, VECTOR_ADD_FILE};
use hetero_primitives::{
    try_host_vec, verify_exact, BufferId, BufferIntent, Clock, ComputeError, DeviceInfo,
    DeviceKind, DeviceRunner, Dispatch, KernelSource, Verification, WorkPartition,
};

use crate::cpu_baselines::sequential;
use crate::data_gen::{ramp_f32, DataGenerator};
use crate::error::BenchError;

use super::{BenchContext, Executor, Experiment, PhaseTimes};

/// 2^24 elements.
pub const DEFAULT_SIZE: usize = 16_777_216;

struct Session {
    runner: DeviceRunner,
    a: BufferId<f32>,
    b: BufferId<f32>,
    c: BufferId<f32>,
    partition: WorkPartition,
}

pub struct VectorAddExperiment {
    a: Vec<f32>,
    b: Vec<f32>,
    device_out: Vec<f32>,
    host_out: Vec<f32>,
    device: Option<DeviceInfo>,
    session: Option<Session>,
}

impl VectorAddExperiment {
    pub fn new() -> Self {
        Self {
            a: Vec::new(),
            b: Vec::new(),
            device_out: Vec::new(),
            host_out: Vec::new(),
            device: None,
            session: None,
        }
    }

    fn sample_line(&self, i: usize) -> String {
        format!(
            "A[{i}] + B[{i}] = {:.1} + {:.1} = {:.1}",
            self.a[i], self.b[i], self.device_out[i]
        )
    }
}

impl Experiment for VectorAddExperiment {
    fn name(&self) -> &str {
        "vector-add"
    }

    fn description(&self) -> &str {
        "Elementwise f32 vector addition (OpenCL kernel vs host loop)"
    }

    fn default_sizes(&self) -> Vec<usize> {
        vec![DEFAULT_SIZE]
    }

    fn input_bytes(&self, size: usize) -> usize {
        2 * size * std::mem::size_of::<f32>()
    }

    fn setup(
        &mut self,
        ctx: &BenchContext,
        size: usize,
        _gen: &mut DataGenerator,
    ) -> Result<(), BenchError> {
        self.teardown();

        self.a = ramp_f32(size, 1.0)?;
        self.b = ramp_f32(size, 2.0)?;
        self.device_out = try_host_vec(size, 0.0)?;
        self.host_out = try_host_vec(size, 0.0)?;

        let mut runner = DeviceRunner::open(ctx.clock, DeviceKind::Gpu, Some(DeviceKind::Cpu))?;
        self.device = Some(runner.info().clone());

        let source = KernelSource::load_from(&ctx.kernel_dir, VECTOR_ADD_FILE)?;
        runner.build_program(&source)?;

        let a = runner.upload(&self.a, BufferIntent::ReadOnlyInput)?;
        let b = runner.upload(&self.b, BufferIntent::ReadOnlyInput)?;
        let c = runner.upload(&self.device_out, BufferIntent::WriteOnlyOutput)?;
        let partition = WorkPartition::linear(size).map_err(ComputeError::from)?;

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
        let timer = clock.timer();
        sequential::vector_add(&self.a, &self.b, &mut self.host_out);
        timer.stop()
    }

    fn run_parallel(&mut self, _clock: Clock) -> Result<PhaseTimes, BenchError> {
        let s = self
            .session
            .as_mut()
            .ok_or_else(|| BenchError::NotSetUp("vector-add".to_string()))?;

        let launch = Dispatch::new(VECTOR_ADD_ENTRY, &s.partition, s.c)
            .arg(s.a)
            .arg(s.b)
            .arg(s.c);
        let compute_ms = s.runner.dispatch(&launch)?;
        let transfer_ms = s.runner.download(s.c, &mut self.device_out)?;

        Ok(PhaseTimes {
            compute_ms,
            transfer_ms: Some(transfer_ms),
        })
    }

    fn validate(&self) -> Verification {
        verify_exact(&self.device_out, &self.host_out)
    }

    fn executor(&self) -> Executor {
        match &self.device {
            Some(info) => Executor::Device(info.clone()),
            None => Executor::host_pool(),
        }
    }

    fn samples(&self) -> Vec<String> {
        let n = self.device_out.len().min(self.a.len());
        if n == 0 {
            return Vec::new();
        }
        let head = 0..n.min(5);
        let tail = n.saturating_sub(5).max(head.end)..n;
        let mut lines: Vec<String> = head.map(|i| self.sample_line(i)).collect();
        if !tail.is_empty() {
            lines.push("...".to_string());
            lines.extend(tail.map(|i| self.sample_line(i)));
        }
        lines
    }

    fn metrics(&self, compute_ms: f64, size: usize) -> HashMap<String, f64> {
        let mut m = HashMap::new();
        if compute_ms > 0.0 {
            // Two reads and one write per element.
            let bytes = 3.0 * size as f64 * std::mem::size_of::<f32>() as f64;
            m.insert("gb_per_sec".to_string(), bytes / (compute_ms * 1e6));
        }
        m
    }

    fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            let released = session.runner.release_all();
            tracing::debug!(benchmark = "vector-add", ?released, "device handles released");
        }
    }
}
