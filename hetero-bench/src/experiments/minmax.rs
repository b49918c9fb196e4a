//! Array minimum and maximum: one sequential pass vs a rayon reduction.

use hetero_primitives::{Clock, Verification};

use crate::cpu_baselines::{rayon_reduce, sequential};
use crate::data_gen::DataGenerator;
use crate::error::BenchError;

use super::{BenchContext, Executor, Experiment, PhaseTimes};

pub const DEFAULT_SIZE: usize = 10_000;
/// Values are drawn from `[0, VALUE_BOUND)`.
pub const VALUE_BOUND: i32 = 100_000;

pub struct MinMaxExperiment {
    data: Vec<i32>,
    sequential: Option<(i32, i32)>,
    parallel: Option<(i32, i32)>,
}

impl MinMaxExperiment {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            sequential: None,
            parallel: None,
        }
    }
}

fn show(result: Option<(i32, i32)>) -> String {
    match result {
        Some((lo, hi)) => format!("min={lo}, max={hi}"),
        None => "empty input".to_string(),
    }
}

impl Experiment for MinMaxExperiment {
    fn name(&self) -> &str {
        "minmax"
    }

    fn description(&self) -> &str {
        "Min/max of i32 array (rayon parallel reduce vs single pass)"
    }

    fn default_sizes(&self) -> Vec<usize> {
        vec![DEFAULT_SIZE]
    }

    fn input_bytes(&self, size: usize) -> usize {
        size * std::mem::size_of::<i32>()
    }

    fn setup(
        &mut self,
        _ctx: &BenchContext,
        size: usize,
        gen: &mut DataGenerator,
    ) -> Result<(), BenchError> {
        self.data = gen.uniform_i32(size, VALUE_BOUND)?;
        self.sequential = None;
        self.parallel = None;
        Ok(())
    }

    fn run_sequential(&mut self, clock: Clock) -> f64 {
        let timer = clock.timer();
        let result = sequential::min_max(&self.data);
        let ms = timer.stop();
        self.sequential = result;
        ms
    }

    fn run_parallel(&mut self, clock: Clock) -> Result<PhaseTimes, BenchError> {
        let timer = clock.timer();
        let result = rayon_reduce::par_min_max(&self.data);
        let ms = timer.stop();
        self.parallel = result;
        Ok(PhaseTimes::host(ms))
    }

    fn validate(&self) -> Verification {
        let (seq, par) = (self.sequential, self.parallel);
        let errors = match (seq, par) {
            (Some((s_lo, s_hi)), Some((p_lo, p_hi))) => {
                usize::from(s_lo != p_lo) + usize::from(s_hi != p_hi)
            }
            (None, None) => 0,
            _ => 2,
        };
        Verification::from_error_count(2, errors)
    }

    fn executor(&self) -> Executor {
        Executor::host_pool()
    }

    fn samples(&self) -> Vec<String> {
        vec![
            format!("sequential: {}", show(self.sequential)),
            format!("parallel:   {}", show(self.parallel)),
        ]
    }
}
