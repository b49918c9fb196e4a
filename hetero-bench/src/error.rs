use hetero_primitives::ComputeError;

/// Fatal errors of a benchmark session. Any of these ends the process with
/// exit status 1.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("{} error: {source}", source.phase())]
    Compute {
        #[from]
        source: ComputeError,
    },

    #[error("unknown benchmark '{name}'. Available: {available}")]
    UnknownBenchmark { name: String, available: String },

    #[error("unknown profile '{0}'. Valid: quick, standard, thorough")]
    UnknownProfile(String),

    #[error("invalid size '{input}': {reason}")]
    InvalidSize { input: String, reason: String },

    #[cfg_attr(not(feature = "opencl"), allow(dead_code))]
    #[error("benchmark '{0}' ran before setup")]
    NotSetUp(String),

    #[error("benchmark '{0}' needs an OpenCL device; rebuild with `--features opencl`")]
    DeviceSupportDisabled(String),

    #[error("cannot write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize results: {0}")]
    Serialize(#[from] serde_json::Error),
}
