//! Wall-clock timing for benchmark phases.
//!
//! A [`Clock`] is calibrated once at process start and passed to whatever
//! needs to time things. Timers are handed out by the clock so every
//! measurement in a run shares the same monotonic origin.

use std::time::Instant;

/// Process-scoped monotonic timebase.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    /// Capture the monotonic origin. Call once from `main`.
    pub fn calibrate() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Seconds elapsed since calibration.
    pub fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    /// Start a timer for one phase.
    pub fn timer(&self) -> BenchTimer {
        BenchTimer {
            start: Instant::now(),
        }
    }
}

/// Running phase timer.
#[derive(Debug)]
pub struct BenchTimer {
    start: Instant,
}

impl BenchTimer {
    /// Elapsed time in milliseconds.
    pub fn stop(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// `baseline / candidate`, or 0.0 when the candidate time is not positive.
pub fn speedup(baseline_ms: f64, candidate_ms: f64) -> f64 {
    if candidate_ms > 0.0 {
        baseline_ms / candidate_ms
    } else {
        0.0
    }
}
