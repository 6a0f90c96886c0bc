use indicatif::{ProgressBar, ProgressStyle};

/// Shows how many test case executions are left across the whole run.
///
/// Cloning is cheap and every clone drives the same bar.
#[derive(Debug, Clone)]
pub struct Progress {
    bar: ProgressBar,
}

impl Progress {
    /// A progress bar over `total` case executions, drawn only if `enabled`.
    pub fn new(total: u64, enabled: bool) -> Self {
        if !enabled {
            return Self::hidden();
        }

        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} [{elapsed_precise}] {msg}",
        )
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|e| {
            log::warn!("Invalid progress style, using the default: {e}");
            ProgressStyle::default_bar()
        });
        bar.set_style(style);

        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub(crate) fn case_done(&self, suite: &str, test: &str) {
        self.bar.set_message(format!("{suite}/{test}"));
        self.bar.inc(1);
    }

    /// Count cases that will never run, e.g. after a failed setup.
    pub(crate) fn skip(&self, count: u64) {
        self.bar.inc(count);
    }

    pub fn finish(&self) {
        log::trace!("Progress finished");
        self.bar.finish_and_clear();
    }
}
