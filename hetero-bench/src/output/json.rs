//! JSON output: host header, timestamp and every data point.

use std::fs;

use serde::Serialize;

use crate::error::BenchError;
use crate::harness::{BenchConfig, DataPoint};

use super::ensure_parent;

#[derive(Serialize)]
struct JsonReport<'a> {
    host: HostHeader,
    runs: u32,
    warmup: u32,
    seed: u64,
    timestamp: String,
    results: &'a [DataPoint],
}

#[derive(Serialize)]
struct HostHeader {
    os: &'static str,
    arch: &'static str,
    threads: usize,
}

pub fn to_json(data: &[DataPoint], config: &BenchConfig) -> Result<String, BenchError> {
    let report = JsonReport {
        host: HostHeader {
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            threads: rayon::current_num_threads(),
        },
        runs: config.runs,
        warmup: config.warmup,
        seed: config.seed,
        timestamp: chrono::Utc::now().to_rfc3339(),
        results: data,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn write_json(path: &str, data: &[DataPoint], config: &BenchConfig) -> Result<(), BenchError> {
    let json = to_json(data, config)?;
    ensure_parent(path)?;
    fs::write(path, json).map_err(|source| BenchError::Output {
        path: path.to_string(),
        source,
    })?;
    tracing::info!(path, "JSON results written");
    Ok(())
}
