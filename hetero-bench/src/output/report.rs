//! Detailed console report for one data point: executor, size, phase
//! timings, speedups, verification verdict and sample values.

use std::fmt::Write;

use crate::harness::{format_size, DataPoint};

const MIB: f64 = 1024.0 * 1024.0;

/// Render the report block for `dp`.
pub fn render(dp: &DataPoint) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, dp);
    out
}

fn write_report(out: &mut String, dp: &DataPoint) -> std::fmt::Result {
    writeln!(out, "\n=== {} @ {} ===", dp.experiment, format_size(dp.size))?;
    match dp.executor.device() {
        Some(info) => {
            writeln!(out, "Platform:  {}", info.platform)?;
            writeln!(out, "Device:    {} ({})", info.name, info.kind)?;
            if info.fell_back {
                writeln!(out, "           (no GPU found, fell back to CPU device)")?;
            }
        }
        None => writeln!(out, "Executor:  {}", dp.executor)?,
    }
    writeln!(
        out,
        "Size:      {} elements ({:.2} MiB input)",
        dp.size,
        dp.input_bytes as f64 / MIB
    )?;
    writeln!(out)?;

    let device = dp.transfer.is_some();
    writeln!(out, "{:<28}{:>12.3} ms", "Sequential:", dp.sequential.mean)?;
    if device {
        writeln!(out, "{:<28}{:>12.3} ms", "Kernel only:", dp.parallel.mean)?;
    } else {
        writeln!(out, "{:<28}{:>12.3} ms", "Parallel:", dp.parallel.mean)?;
    }
    if let Some(t) = &dp.transfer {
        writeln!(out, "{:<28}{:>12.3} ms", "Readback:", t.mean)?;
    }
    if let Some(t) = &dp.parallel_total {
        writeln!(out, "{:<28}{:>12.3} ms", "Kernel + readback:", t.mean)?;
    }
    writeln!(out)?;

    if dp.parallel.mean > 0.0 {
        let label = if device {
            "Speedup (kernel only):"
        } else {
            "Speedup:"
        };
        writeln!(out, "{:<28}{:>11.2}x", label, dp.speedup)?;
    }
    if let Some(s) = dp.speedup_with_transfer.filter(|s| *s > 0.0) {
        writeln!(out, "{:<28}{:>11.2}x", "Speedup (with transfer):", s)?;
    }

    let v = &dp.verification;
    writeln!(out, "\nVerification: {} ({} errors)", v.verdict(), v.errors)?;
    if v.tolerance.is_some() || v.max_abs_diff > 0.0 {
        writeln!(out, "Max difference: {:.6}", v.max_abs_diff)?;
    }
    for m in &v.mismatches {
        writeln!(
            out,
            "  mismatch at {}: device={:.6}, host={:.6}, diff={:.6}",
            m.index, m.device, m.host, m.diff
        )?;
    }

    if !dp.samples.is_empty() {
        writeln!(out, "\nSamples:")?;
        for line in &dp.samples {
            writeln!(out, "  {line}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiments::Executor;
    use crate::stats::compute_stats;
    use hetero_primitives::{verify_exact, DeviceInfo, DeviceKind};
    use std::collections::HashMap;

    fn device_point() -> DataPoint {
        let host = vec![1.0f32, 2.0, 3.0];
        let device = vec![1.0f32, 2.5, 3.0];
        DataPoint {
            experiment: "vector-add".to_string(),
            size: 3,
            input_bytes: 24,
            executor: Executor::Device(DeviceInfo {
                platform: "Test Platform".to_string(),
                name: "Test GPU".to_string(),
                vendor: "Test".to_string(),
                kind: DeviceKind::Cpu,
                fell_back: true,
                max_work_group_size: 256,
                global_mem_bytes: 1 << 30,
            }),
            sequential: compute_stats(&[10.0]),
            parallel: compute_stats(&[2.0]),
            transfer: Some(compute_stats(&[3.0])),
            parallel_total: Some(compute_stats(&[5.0])),
            speedup: 5.0,
            speedup_with_transfer: Some(2.0),
            verification: verify_exact(&device, &host),
            samples: vec!["A[0] + B[0] = 0.0 + 0.0 = 0.0".to_string()],
            metrics: HashMap::new(),
        }
    }

    #[test]
    fn test_device_report() {
        let text = render(&device_point());
        assert!(text.contains("=== vector-add @ 3 ==="));
        assert!(text.contains("Device:    Test GPU (CPU)"));
        assert!(text.contains("fell back to CPU"));
        assert!(text.contains("Kernel only:"));
        assert!(text.contains("Kernel + readback:"));
        assert!(text.contains("5.00x"));
        assert!(text.contains("Speedup (with transfer):"));
        assert!(text.contains("Verification: FAILED (1 errors)"));
        assert!(text.contains("mismatch at 1: device=2.500000, host=2.000000"));
        assert!(text.contains("A[0] + B[0]"));
    }

    #[test]
    fn test_host_report() {
        let mut dp = device_point();
        dp.experiment = "minmax".to_string();
        dp.executor = Executor::HostPool { threads: 4 };
        dp.transfer = None;
        dp.parallel_total = None;
        dp.speedup_with_transfer = None;
        dp.verification = hetero_primitives::Verification::from_error_count(2, 0);
        let text = render(&dp);
        assert!(text.contains("Executor:  rayon pool (4 threads)"));
        assert!(text.contains("Parallel:"));
        assert!(!text.contains("Readback"));
        assert!(text.contains("Verification: PASSED (0 errors)"));
        assert!(!text.contains("Max difference"));
    }
}
