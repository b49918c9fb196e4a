use serde::{Deserialize, Serialize};

/// Summary of the timing samples (milliseconds) of one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: f64,
    pub cv_percent: f64,
    pub sample_count: usize,
    pub outliers_removed: usize,
}

/// Summarize `samples`, dropping values outside `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]`
/// as long as at least two samples remain.
pub fn compute_stats(samples: &[f64]) -> Stats {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let kept: Vec<f64> = if sorted.len() >= 4 {
        let (q1, q3) = (percentile(&sorted, 0.25), percentile(&sorted, 0.75));
        let fence = 1.5 * (q3 - q1);
        let inside: Vec<f64> = sorted
            .iter()
            .copied()
            .filter(|v| (q1 - fence..=q3 + fence).contains(v))
            .collect();
        if inside.len() >= 2 {
            inside
        } else {
            sorted.clone()
        }
    } else {
        sorted.clone()
    };

    let n = kept.len();
    if n == 0 {
        return Stats::default();
    }

    let mean = kept.iter().sum::<f64>() / n as f64;
    let stddev = if n > 1 {
        (kept.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    Stats {
        mean,
        median: percentile(&kept, 0.5),
        min: kept[0],
        max: kept[n - 1],
        stddev,
        cv_percent: if mean > 0.0 { stddev / mean * 100.0 } else { 0.0 },
        sample_count: n,
        outliers_removed: sorted.len() - n,
    }
}

/// Per-run sums of two equally long sample series (e.g. kernel + readback).
pub fn pairwise_sum(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// Linear-interpolated quantile `q` in `[0, 1]` of a sorted, non-empty slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = q * (sorted.len() - 1) as f64;
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(compute_stats(&[]), Stats::default());
    }

    #[test]
    fn test_single_shot() {
        let s = compute_stats(&[12.5]);
        assert_eq!(s.mean, 12.5);
        assert_eq!(s.median, 12.5);
        assert_eq!(s.min, 12.5);
        assert_eq!(s.stddev, 0.0);
        assert_eq!(s.sample_count, 1);
    }

    #[test]
    fn test_basic() {
        let s = compute_stats(&[5.0, 1.0, 3.0, 2.0, 4.0]);
        assert!((s.mean - 3.0).abs() < 1e-12);
        assert!((s.median - 3.0).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 5.0);
        assert!((s.stddev - 2.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(s.outliers_removed, 0);
    }

    #[test]
    fn test_even_median() {
        let s = compute_stats(&[1.0, 2.0, 3.0, 4.0]);
        assert!((s.median - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_outlier_dropped() {
        let mut samples = vec![10.0, 10.1, 9.9, 10.0, 10.2, 9.8, 10.0];
        samples.push(250.0);
        let s = compute_stats(&samples);
        assert_eq!(s.outliers_removed, 1);
        assert!(s.max < 11.0);
    }

    #[test]
    fn test_cv() {
        let s = compute_stats(&[10.0, 20.0]);
        assert!((s.mean - 15.0).abs() < 1e-12);
        let expected = 50f64.sqrt() / 15.0 * 100.0;
        assert!((s.cv_percent - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pairwise_sum() {
        assert_eq!(pairwise_sum(&[1.0, 2.0], &[0.5, 0.25]), vec![1.5, 2.25]);
    }
}
