//! Terminal feedback while package metadata is fetched
//!
//! Single registry requests show a spinner. The outdated check advances a
//! bar once per chunk and keeps a running count of failed lookups in the
//! bar message. Failures are counted even when nothing is drawn.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const CHUNK_TEMPLATE: &str = "{spinner:.cyan} chunk {pos}/{len} [{bar:30.cyan/blue}] {msg}";

/// Progress reporter for registry lookups
pub struct Progress {
    /// Drawing is off for `--quiet`, `--json` and `--offline`
    enabled: bool,
    bar: Option<ProgressBar>,
    dependencies: usize,
    failed: AtomicUsize,
}

impl Progress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bar: None,
            dependencies: 0,
            failed: AtomicUsize::new(0),
        }
    }

    /// A reporter that never draws
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Show a spinner while a single request is in flight
    pub fn spinner(&mut self, message: &str) {
        if !self.enabled {
            return;
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style(SPINNER_TEMPLATE));
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(TICK);
        self.bar = Some(spinner);
    }

    /// Start a bar with one step per chunk of version lookups
    pub fn start_chunks(&mut self, chunks: usize, dependencies: usize) {
        self.dependencies = dependencies;
        self.failed.store(0, Ordering::Relaxed);
        if !self.enabled || chunks == 0 {
            return;
        }

        let bar = ProgressBar::new(chunks as u64);
        bar.set_style(style(CHUNK_TEMPLATE).progress_chars("█▓▒░"));
        bar.set_message(self.summary());
        bar.enable_steady_tick(TICK);
        self.bar = Some(bar);
    }

    /// Record a finished chunk and how many of its lookups failed
    pub fn chunk_done(&self, failed: usize) {
        self.failed.fetch_add(failed, Ordering::Relaxed);
        if let Some(bar) = &self.bar {
            bar.set_message(self.summary());
            bar.inc(1);
        }
    }

    /// Lookups reported failed since the last `start_chunks`
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    /// Remove whatever is currently drawn
    pub fn finish_and_clear(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn summary(&self) -> String {
        match self.failed() {
            0 => format!("{} dependencies", self.dependencies),
            failed => format!("{} dependencies, {} failed", self.dependencies, failed),
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar())
}
