//! CSV output, one row per benchmark and size.

use std::fs;
use std::io::Write;

use crate::error::BenchError;
use crate::harness::DataPoint;

use super::ensure_parent;

pub const HEADER: &str = "experiment,size,executor,seq_mean_ms,par_mean_ms,readback_mean_ms,\
total_mean_ms,speedup,speedup_with_transfer,par_cv_pct,verified,errors";

fn opt(v: Option<f64>, precision: usize) -> String {
    v.map_or_else(String::new, |x| format!("{x:.precision$}"))
}

/// Quote a field if it contains a delimiter or quote.
fn field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn write_rows(out: &mut impl Write, data: &[DataPoint]) -> std::io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for dp in data {
        writeln!(
            out,
            "{},{},{},{:.4},{:.4},{},{},{:.2},{},{:.1},{},{}",
            field(&dp.experiment),
            dp.size,
            field(&dp.executor.to_string()),
            dp.sequential.mean,
            dp.parallel.mean,
            opt(dp.transfer.as_ref().map(|t| t.mean), 4),
            opt(dp.parallel_total.as_ref().map(|t| t.mean), 4),
            dp.speedup,
            opt(dp.speedup_with_transfer, 2),
            dp.parallel.cv_percent,
            dp.verification.passed(),
            dp.verification.errors,
        )?;
    }
    Ok(())
}

pub fn write_csv(path: &str, data: &[DataPoint]) -> Result<(), BenchError> {
    let to_output = |source| BenchError::Output {
        path: path.to_string(),
        source,
    };
    ensure_parent(path)?;
    let mut file = fs::File::create(path).map_err(to_output)?;
    write_rows(&mut file, data).map_err(to_output)?;
    tracing::info!(path, "CSV results written");
    Ok(())
}
