//! Selection sort: classic O(n^2) sort vs the same algorithm with each
//! minimum search spread over the rayon pool.

use hetero_primitives::{Clock, Verification};

use crate::cpu_baselines::{rayon_selection, sequential};
use crate::data_gen::DataGenerator;
use crate::error::BenchError;

use super::{BenchContext, Executor, Experiment, PhaseTimes};

pub const DEFAULT_SIZES: [usize; 2] = [1_000, 10_000];
pub const VALUE_BOUND: i32 = 10_000;

pub struct SelectionSortExperiment {
    input: Vec<i32>,
    sequential: Vec<i32>,
    parallel: Vec<i32>,
}

impl SelectionSortExperiment {
    pub fn new() -> Self {
        Self {
            input: Vec::new(),
            sequential: Vec::new(),
            parallel: Vec::new(),
        }
    }
}

fn preview(data: &[i32]) -> String {
    let head: Vec<String> = data.iter().take(10).map(|v| v.to_string()).collect();
    if data.len() > 10 {
        format!("[{}, ...]", head.join(", "))
    } else {
        format!("[{}]", head.join(", "))
    }
}

impl Experiment for SelectionSortExperiment {
    fn name(&self) -> &str {
        "selection-sort"
    }

    fn description(&self) -> &str {
        "Selection sort of i32 array (parallel min search with mutex merge vs sequential)"
    }

    fn default_sizes(&self) -> Vec<usize> {
        DEFAULT_SIZES.to_vec()
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
        self.input = gen.uniform_i32(size, VALUE_BOUND)?;
        self.sequential.clear();
        self.parallel.clear();
        Ok(())
    }

    fn run_sequential(&mut self, clock: Clock) -> f64 {
        self.sequential.clone_from(&self.input);
        let timer = clock.timer();
        sequential::selection_sort(&mut self.sequential);
        timer.stop()
    }

    fn run_parallel(&mut self, clock: Clock) -> Result<PhaseTimes, BenchError> {
        self.parallel.clone_from(&self.input);
        let timer = clock.timer();
        rayon_selection::par_selection_sort(&mut self.parallel);
        Ok(PhaseTimes::host(timer.stop()))
    }

    /// Errors are out-of-order neighbours in either output plus positions
    /// where the two outputs disagree.
    fn validate(&self) -> Verification {
        let disagreements = self
            .sequential
            .iter()
            .zip(&self.parallel)
            .filter(|(s, p)| s != p)
            .count()
            + self.sequential.len().abs_diff(self.parallel.len());
        let errors = sequential::descents(&self.sequential)
            + sequential::descents(&self.parallel)
            + disagreements;
        Verification::from_error_count(self.input.len(), errors)
    }

    fn executor(&self) -> Executor {
        Executor::host_pool()
    }

    fn samples(&self) -> Vec<String> {
        vec![
            format!("input:      {}", preview(&self.input)),
            format!("sequential: {}", preview(&self.sequential)),
            format!("parallel:   {}", preview(&self.parallel)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_full_cycle_passes() {
        let ctx = BenchContext {
            clock: Clock::calibrate(),
            kernel_dir: PathBuf::from("kernels"),
        };
        let mut exp = SelectionSortExperiment::new();
        exp.setup(&ctx, 1_000, &mut DataGenerator::new(42)).unwrap();
        exp.run_sequential(ctx.clock);
        exp.run_parallel(ctx.clock).unwrap();
        assert!(exp.validate().passed());
        assert_eq!(exp.sequential.len(), 1_000);
        assert_eq!(sequential::descents(&exp.parallel), 0);
    }

    #[test]
    fn test_unsorted_output_fails() {
        let mut exp = SelectionSortExperiment::new();
        exp.input = vec![3, 1, 2];
        exp.sequential = vec![1, 2, 3];
        exp.parallel = vec![1, 3, 2];
        let v = exp.validate();
        assert!(!v.passed());
        // one descent (3 > 2) and two positions that differ
        assert_eq!(v.errors, 3);
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview(&[1, 2]), "[1, 2]");
        assert!(preview(&(0..20).collect::<Vec<_>>()).ends_with(", ...]"));
    }
}
