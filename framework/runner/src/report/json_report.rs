use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use dance_compare::prelude::Verdict;
use dance_config::prelude::ConfigError;
use serde::Serialize;

use crate::backend::Backends;
use crate::report::{ReportCollector, RunSummary};

/// Writes the results of a run to a JSON file.
///
/// Verdicts carry both raw outcomes for divergences, with documents in canonical Extended JSON so
/// that values like `NaN` and `-0.0` are preserved.
#[derive(Debug)]
pub struct JsonReportCollector {
    path: PathBuf,
    run_id: String,
    backends: Backends,
    started_at: DateTime<Utc>,
    summary: RunSummary,
    cases: Vec<CaseEntry>,
    config_errors: Vec<ConfigErrorEntry>,
}

#[derive(Debug, Serialize)]
struct CaseEntry {
    suite: String,
    test: String,
    #[serde(flatten)]
    verdict: Verdict,
}

#[derive(Debug, Serialize)]
struct ConfigErrorEntry {
    suite: String,
    error: ConfigError,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: &'a str,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    backends: &'a Backends,
    summary: &'a RunSummary,
    cases: &'a [CaseEntry],
    config_errors: &'a [ConfigErrorEntry],
}

impl JsonReportCollector {
    pub fn new(path: impl Into<PathBuf>, run_id: impl Into<String>, backends: Backends) -> Self {
        Self {
            path: path.into(),
            run_id: run_id.into(),
            backends,
            started_at: Utc::now(),
            summary: RunSummary::default(),
            cases: Vec::new(),
            config_errors: Vec::new(),
        }
    }
}

impl ReportCollector for JsonReportCollector {
    fn add_verdict(&mut self, suite: &str, test: &str, verdict: &Verdict) {
        self.summary.add_verdict(suite, test, verdict);
        self.cases.push(CaseEntry {
            suite: suite.to_string(),
            test: test.to_string(),
            verdict: verdict.clone(),
        });
    }

    fn add_config_error(&mut self, suite: &str, error: &ConfigError) {
        self.summary.add_config_error(suite, error);
        self.config_errors.push(ConfigErrorEntry {
            suite: suite.to_string(),
            error: error.clone(),
        });
    }

    fn finalize(&self) -> anyhow::Result<()> {
        let report = JsonReport {
            run_id: &self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            backends: &self.backends,
            summary: &self.summary,
            cases: &self.cases,
            config_errors: &self.config_errors,
        };

        let file = std::fs::File::create(&self.path)
            .with_context(|| format!("Failed to create report file {}", self.path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &report)
            .with_context(|| format!("Failed to write report to {}", self.path.display()))?;

        log::info!("Wrote report {} to {}", self.run_id, self.path.display());

        Ok(())
    }
}
