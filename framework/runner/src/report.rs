mod json_report;
mod summary_report;

use dance_compare::prelude::Verdict;
use dance_config::prelude::ConfigError;
use serde::Serialize;

pub use json_report::JsonReportCollector;
pub use summary_report::SummaryReportCollector;

/// Receives every result of a run.
pub trait ReportCollector {
    fn add_verdict(&mut self, suite: &str, test: &str, verdict: &Verdict);

    /// Record a suite that could not be loaded.
    fn add_config_error(&mut self, suite: &str, error: &ConfigError);

    fn finalize(&self) -> anyhow::Result<()>;
}

/// Counts of each kind of result in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub matched: usize,
    pub diverged: usize,
    pub inconclusive: usize,
    pub config_errors: usize,
}

impl RunSummary {
    /// A run succeeds when every case matched and every suite loaded.
    pub fn is_success(&self) -> bool {
        self.diverged == 0 && self.inconclusive == 0 && self.config_errors == 0
    }

    pub fn total_cases(&self) -> usize {
        self.matched + self.diverged + self.inconclusive
    }
}

impl ReportCollector for RunSummary {
    fn add_verdict(&mut self, _suite: &str, _test: &str, verdict: &Verdict) {
        match verdict {
            Verdict::Match => self.matched += 1,
            Verdict::Diverge(_) => self.diverged += 1,
            Verdict::Inconclusive { .. } => self.inconclusive += 1,
        }
    }

    fn add_config_error(&mut self, _suite: &str, _error: &ConfigError) {
        self.config_errors += 1;
    }

    fn finalize(&self) -> anyhow::Result<()> {
        log::info!(
            "{} matched, {} diverged, {} inconclusive, {} config error(s)",
            self.matched,
            self.diverged,
            self.inconclusive,
            self.config_errors
        );
        Ok(())
    }
}
