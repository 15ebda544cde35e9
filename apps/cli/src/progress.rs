//! Terminal progress reporting for `doxbook build`.

use std::path::Path;
use std::time::Duration;

use doxbook_core::{ProgressReporter, RunReport, Stage};
use indicatif::{ProgressBar, ProgressStyle};

/// CLI progress reporter using an indicatif spinner.
pub(crate) struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    pub(crate) fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn stage(&self, _stage: Stage, detail: &str) {
        self.spinner.set_message(detail.to_string());
    }

    fn stage_done(&self, stage: Stage) {
        self.spinner.println(format!("  ok  {stage}"));
    }

    fn file_extracted(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Parsing [{current}/{total}] {}", path.display()));
    }

    fn file_skipped(&self, path: &Path, reason: &str) {
        self.spinner
            .println(format!("  skip {}: {reason}", path.display()));
    }

    fn failed(&self, stage: Stage, message: &str) {
        self.spinner
            .abandon_with_message(format!("failed while {stage}: {message}"));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}
