//! Elementwise comparison of a device result against a host reference.

use serde::Serialize;

/// Absolute tolerance for matrix products, where host and device sum in
/// different orders.
pub const MATMUL_TOLERANCE: f64 = 1e-3;

/// Mismatches kept for the report; the error count covers all of them.
pub const MAX_REPORTED_MISMATCHES: usize = 5;

/// One element that failed the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Mismatch {
    pub index: usize,
    pub device: f64,
    pub host: f64,
    pub diff: f64,
}

/// Outcome of comparing a device buffer to its host reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub checked: usize,
    pub errors: usize,
    pub max_abs_diff: f64,
    /// `None` means exact equality was required.
    pub tolerance: Option<f64>,
    pub mismatches: Vec<Mismatch>,
}

impl Verification {
    /// Result of a check done by other means (scalar equality, sortedness),
    /// carrying only the error count.
    pub fn from_error_count(checked: usize, errors: usize) -> Self {
        Self {
            checked,
            errors,
            max_abs_diff: 0.0,
            tolerance: None,
            mismatches: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.errors == 0
    }

    pub fn verdict(&self) -> &'static str {
        if self.passed() {
            "PASSED"
        } else {
            "FAILED"
        }
    }
}

/// Require `device[i] == host[i]` for every index.
pub fn verify_exact(device: &[f32], host: &[f32]) -> Verification {
    compare(device, host, None)
}

/// Require `|device[i] - host[i]| <= tolerance` for every index.
pub fn verify_within(device: &[f32], host: &[f32], tolerance: f64) -> Verification {
    compare(device, host, Some(tolerance))
}

fn compare(device: &[f32], host: &[f32], tolerance: Option<f64>) -> Verification {
    let mut errors = 0usize;
    let mut max_abs_diff = 0.0f64;
    let mut mismatches = Vec::new();

    for (index, (&d, &h)) in device.iter().zip(host).enumerate() {
        let diff = (d as f64 - h as f64).abs();
        if diff > max_abs_diff {
            max_abs_diff = diff;
        }
        let bad = match tolerance {
            None => d != h,
            Some(tol) => !(diff <= tol),
        };
        if bad {
            errors += 1;
            if mismatches.len() < MAX_REPORTED_MISMATCHES {
                mismatches.push(Mismatch {
                    index,
                    device: d as f64,
                    host: h as f64,
                    diff,
                });
            }
        }
    }

    // Elements present on one side only count as errors.
    errors += device.len().abs_diff(host.len());

    Verification {
        checked: device.len().max(host.len()),
        errors,
        max_abs_diff,
        tolerance,
        mismatches,
    }
}
