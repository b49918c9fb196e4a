mod cli;
mod config;
mod cpu_baselines;
mod data_gen;
mod error;
mod experiments;
mod harness;
mod output;
mod stats;

use std::process::ExitCode;

use clap::Parser;
use cli::BenchArgs;
use config::{parse_sizes, resolve_runs};
use error::BenchError;
use experiments::BenchContext;
use harness::{run_experiment, BenchConfig, DataPoint};
use hetero_primitives::{Clock, DEVICE_SUPPORT};
use output::progress::BenchProgress;

/// Exit status when `--strict-verify` is set and a verification failed.
const EXIT_VERIFY_FAILED: u8 = 2;

fn setup_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = BenchArgs::parse();
    setup_logging(args.log_level());

    match run(&args) {
        Ok(results) => {
            let failed = results.iter().filter(|dp| !dp.verification.passed()).count();
            if failed > 0 && args.strict_verify {
                eprintln!("{failed} verification(s) FAILED");
                ExitCode::from(EXIT_VERIFY_FAILED)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &BenchArgs) -> Result<Vec<DataPoint>, BenchError> {
    let clock = Clock::calibrate();

    let sizes = args.sizes.as_deref().map(parse_sizes).transpose()?;
    let (runs, warmup) = resolve_runs(args.profile.as_deref(), args.runs, args.warmup)?;
    let mut selected = experiments::select(&args.benchmarks, args.is_all_suite())?;
    if !DEVICE_SUPPORT {
        tracing::info!("built without the `opencl` feature; device benchmarks unavailable");
    }

    let config = BenchConfig {
        sizes,
        runs,
        warmup,
        seed: args.seed,
    };
    let ctx = BenchContext {
        clock,
        kernel_dir: args.kernel_dir.clone(),
    };

    println!("hetero-bench: sequential vs parallel benchmarks");
    println!(
        "  Benchmarks: {}",
        selected
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    match &config.sizes {
        Some(sizes) => println!("  Sizes: {sizes:?}"),
        None => println!("  Sizes: benchmark defaults"),
    }
    println!("  Runs: {runs}, Warmup: {warmup}, Seed: {}", config.seed);
    println!("  Host threads: {}", rayon::current_num_threads());
    println!("  Kernel dir: {}", ctx.kernel_dir.display());
    if let Some(path) = &args.json_file {
        println!("  JSON output: {path}");
    }
    if let Some(path) = &args.csv_file {
        println!("  CSV output: {path}");
    }

    let progress = BenchProgress::new();
    let mut all_results: Vec<DataPoint> = Vec::new();

    for exp in selected.iter_mut() {
        tracing::debug!(benchmark = exp.name(), description = exp.description(), "starting");
        let cb = progress.callback();
        let results = run_experiment(exp.as_mut(), &config, &ctx, Some(&cb));
        let results = match results {
            Ok(r) => r,
            Err(e) => {
                progress.finish();
                return Err(e);
            }
        };
        progress.suspend(|| {
            for dp in &results {
                print!("{}", output::report::render(dp));
            }
        });
        all_results.extend(results);
    }
    progress.finish();

    output::table::render_summary(&all_results);

    if let Some(path) = &args.json_file {
        output::json::write_json(path, &all_results, &config)?;
        println!("JSON results written to: {path}");
    }
    if let Some(path) = &args.csv_file {
        output::csv::write_csv(path, &all_results)?;
        println!("CSV results written to: {path}");
    }

    tracing::debug!(elapsed_s = clock.now_secs(), "session finished");
    Ok(all_results)
}
