use std::path::PathBuf;

use clap::Parser;

/// Sequential vs parallel benchmarks: OpenCL kernels and a rayon host pool
#[derive(Parser, Debug)]
#[command(name = "hetero-bench", version, about)]
pub struct BenchArgs {
    /// Benchmarks to run: vector-add, matmul, minmax, selection-sort.
    /// Use "all" (or nothing) to run every benchmark this build supports.
    #[arg(value_name = "BENCHMARKS")]
    pub benchmarks: Vec<String>,

    /// Problem sizes, overriding each benchmark's defaults (e.g. 16M, 512, 10K).
    /// For matmul a size of N means N x N matrices.
    #[arg(long, value_delimiter = ',')]
    pub sizes: Option<Vec<String>>,

    /// Directory holding vector_add.cl and matrix_multiply.cl
    #[arg(long, default_value = "kernels")]
    pub kernel_dir: PathBuf,

    /// Seed for generated inputs
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of measured runs per size [default: 1, or the profile's]
    #[arg(long)]
    pub runs: Option<u32>,

    /// Number of discarded warmup runs per size [default: 0, or the profile's]
    #[arg(long)]
    pub warmup: Option<u32>,

    /// Run profile: quick (3 runs/1 warmup), standard (10/3), thorough (30/3)
    #[arg(long)]
    pub profile: Option<String>,

    /// Write JSON results to file
    #[arg(long)]
    pub json_file: Option<String>,

    /// Write CSV results to file
    #[arg(long)]
    pub csv_file: Option<String>,

    /// Exit with status 2 when any verification fails
    #[arg(long)]
    pub strict_verify: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl BenchArgs {
    /// True when every available benchmark should run.
    pub fn is_all_suite(&self) -> bool {
        self.benchmarks.is_empty()
            || self.benchmarks.iter().any(|b| b.eq_ignore_ascii_case("all"))
    }

    /// Default log filter for the verbosity flag.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = BenchArgs::parse_from(["hetero-bench"]);
        assert!(args.is_all_suite());
        assert_eq!(args.kernel_dir, PathBuf::from("kernels"));
        assert_eq!(args.seed, 42);
        assert!(args.runs.is_none());
        assert!(!args.strict_verify);
        assert_eq!(args.log_level(), "warn");
    }

    #[test]
    fn test_selection_and_flags() {
        let args = BenchArgs::parse_from([
            "hetero-bench",
            "matmul",
            "minmax",
            "--sizes",
            "256,512",
            "--runs",
            "5",
            "--strict-verify",
            "-vv",
        ]);
        assert!(!args.is_all_suite());
        assert_eq!(args.benchmarks, vec!["matmul", "minmax"]);
        assert_eq!(args.sizes.as_deref(), Some(&["256".to_string(), "512".to_string()][..]));
        assert_eq!(args.runs, Some(5));
        assert!(args.strict_verify);
        assert_eq!(args.log_level(), "trace");
    }
}
