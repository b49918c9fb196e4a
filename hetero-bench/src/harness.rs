//! Measurement harness: correctness run, warmup, measured runs and
//! statistics for every configured size of one benchmark.

use std::collections::HashMap;

use serde::Serialize;

use hetero_primitives::{speedup, Verification};

use crate::data_gen::DataGenerator;
use crate::error::BenchError;
use crate::experiments::{BenchContext, Executor, Experiment, PhaseTimes};
use crate::stats::{compute_stats, pairwise_sum, Stats};

/// Result of one benchmark at one size.
#[derive(Debug, Clone, Serialize)]
pub struct DataPoint {
    pub experiment: String,
    pub size: usize,
    pub input_bytes: usize,
    pub executor: Executor,
    pub sequential: Stats,
    /// Kernel-only (device) or pool (host) time.
    pub parallel: Stats,
    /// Readback time; device benchmarks only.
    pub transfer: Option<Stats>,
    /// Kernel + readback per run; device benchmarks only.
    pub parallel_total: Option<Stats>,
    /// Sequential mean over parallel mean.
    pub speedup: f64,
    /// Sequential mean over kernel + readback mean.
    pub speedup_with_transfer: Option<f64>,
    pub verification: Verification,
    pub samples: Vec<String>,
    pub metrics: HashMap<String, f64>,
}

/// Run counts and size selection for a session.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Overrides each benchmark's default sizes when set.
    pub sizes: Option<Vec<usize>>,
    pub runs: u32,
    pub warmup: u32,
    pub seed: u64,
}

/// Run `exp` at every configured size.
///
/// Per size: setup, one run of both paths, verification, `warmup`
/// discarded runs, then `runs` measured runs of each path. A failed
/// verification is reported, not fatal; any compute error is.
pub fn run_experiment(
    exp: &mut dyn Experiment,
    config: &BenchConfig,
    ctx: &BenchContext,
    progress_cb: Option<&dyn Fn(&str)>,
) -> Result<Vec<DataPoint>, BenchError> {
    let sizes = config
        .sizes
        .clone()
        .unwrap_or_else(|| exp.default_sizes());
    let mut gen = DataGenerator::new(config.seed);
    let mut results = Vec::with_capacity(sizes.len());
    let report = |msg: String| {
        if let Some(cb) = progress_cb {
            cb(&msg);
        }
    };

    for size in sizes {
        let label = format!("{} @ {}", exp.name(), format_size(size));
        let span = tracing::info_span!("benchmark", name = exp.name(), size);
        let _enter = span.enter();

        report(format!("{label}: setup"));
        let result = measure(exp, config, ctx, size, &mut gen, &label, &report);
        // Device handles go back before the next size or the error exit.
        exp.teardown();
        let point = result?;

        report(format!("{label}: done (speedup={:.2}x)", point.speedup));
        results.push(point);
    }

    Ok(results)
}

fn measure(
    exp: &mut dyn Experiment,
    config: &BenchConfig,
    ctx: &BenchContext,
    size: usize,
    gen: &mut DataGenerator,
    label: &str,
    report: &dyn Fn(String),
) -> Result<DataPoint, BenchError> {
    let clock = ctx.clock;
    exp.setup(ctx, size, gen)?;

    exp.run_sequential(clock);
    exp.run_parallel(clock)?;
    let verification = exp.validate();
    if verification.passed() {
        tracing::debug!(checked = verification.checked, "verification passed");
    } else {
        tracing::warn!(
            errors = verification.errors,
            max_abs_diff = verification.max_abs_diff,
            "{label}: verification failed"
        );
    }
    let samples = exp.samples();

    report(format!("{label}: warmup ({} runs)", config.warmup));
    for _ in 0..config.warmup {
        exp.run_sequential(clock);
        exp.run_parallel(clock)?;
    }

    report(format!("{label}: measuring parallel ({} runs)", config.runs));
    let mut compute = Vec::with_capacity(config.runs as usize);
    let mut transfer = Vec::with_capacity(config.runs as usize);
    for _ in 0..config.runs {
        let PhaseTimes {
            compute_ms,
            transfer_ms,
        } = exp.run_parallel(clock)?;
        compute.push(compute_ms);
        if let Some(t) = transfer_ms {
            transfer.push(t);
        }
    }

    report(format!("{label}: measuring sequential ({} runs)", config.runs));
    let sequential_times: Vec<f64> = (0..config.runs).map(|_| exp.run_sequential(clock)).collect();

    let sequential = compute_stats(&sequential_times);
    let parallel = compute_stats(&compute);
    let (transfer, parallel_total) = if transfer.len() == compute.len() && !transfer.is_empty() {
        (
            Some(compute_stats(&transfer)),
            Some(compute_stats(&pairwise_sum(&compute, &transfer))),
        )
    } else {
        (None, None)
    };

    Ok(DataPoint {
        experiment: exp.name().to_string(),
        size,
        input_bytes: exp.input_bytes(size),
        executor: exp.executor(),
        speedup: speedup(sequential.mean, parallel.mean),
        speedup_with_transfer: parallel_total
            .as_ref()
            .map(|t| speedup(sequential.mean, t.mean)),
        metrics: exp.metrics(parallel.mean, size),
        sequential,
        parallel,
        transfer,
        parallel_total,
        verification,
        samples,
    })
}

/// `16777216 -> "16Mi"`, `1000000 -> "1M"`, `512 -> "512"`.
pub fn format_size(size: usize) -> String {
    const MI: usize = 1 << 20;
    const KI: usize = 1 << 10;
    if size >= MI && size % MI == 0 {
        format!("{}Mi", size / MI)
    } else if size >= 1_000_000 && size % 1_000_000 == 0 {
        format!("{}M", size / 1_000_000)
    } else if size >= 1_000 && size % 1_000 == 0 {
        format!("{}K", size / 1_000)
    } else if size >= 16 * KI && size % KI == 0 {
        format!("{}Ki", size / KI)
    } else {
        size.to_string()
    }
}
