//! Spinner shown while benchmarks run.

use indicatif::{ProgressBar, ProgressStyle};

pub struct BenchProgress {
    bar: ProgressBar,
}

impl BenchProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }

    /// Run `f` with the spinner hidden so its output is not overdrawn.
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        self.bar.suspend(f)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Callback for [`run_experiment`](crate::harness::run_experiment).
    pub fn callback(&self) -> impl Fn(&str) + '_ {
        move |msg: &str| {
            tracing::trace!(progress = msg);
            self.bar.set_message(msg.to_string());
        }
    }
}
