mod results_table;

use dance_compare::prelude::Verdict;
use dance_config::prelude::ConfigError;
use itertools::Itertools;
use tabled::settings::Style;
use tabled::Table;

use crate::report::summary_report::results_table::{ProblemRow, ResultRow, SuiteRow};
use crate::report::ReportCollector;

/// Prints the results of a run as tables on stdout.
///
/// Infrastructure problems, suites that failed to load and inconclusive cases, are listed in
/// their own table so they are not mistaken for divergences.
#[derive(Debug, Default)]
pub struct SummaryReportCollector {
    verdicts: Vec<(String, String, Verdict)>,
    config_errors: Vec<(String, ConfigError)>,
}

impl SummaryReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn result_rows(&self) -> Vec<ResultRow> {
        self.verdicts
            .iter()
            .map(|(suite, test, verdict)| {
                let (verdict, detail) = match verdict {
                    Verdict::Match => ("match", String::new()),
                    Verdict::Diverge(d) => ("DIVERGE", d.reason.clone()),
                    Verdict::Inconclusive { reason } => ("inconclusive", reason.clone()),
                };
                ResultRow {
                    suite: suite.clone(),
                    test: test.clone(),
                    verdict,
                    detail,
                }
            })
            .collect()
    }

    fn suite_rows(&self) -> Vec<SuiteRow> {
        self.verdicts
            .iter()
            .chunk_by(|(suite, _, _)| suite.clone())
            .into_iter()
            .map(|(suite, verdicts)| {
                verdicts.fold(
                    SuiteRow {
                        suite,
                        matched: 0,
                        diverged: 0,
                        inconclusive: 0,
                    },
                    |mut row, (_, _, verdict)| {
                        match verdict {
                            Verdict::Match => row.matched += 1,
                            Verdict::Diverge(_) => row.diverged += 1,
                            Verdict::Inconclusive { .. } => row.inconclusive += 1,
                        }
                        row
                    },
                )
            })
            .collect()
    }

    fn problem_rows(&self) -> Vec<ProblemRow> {
        let config = self.config_errors.iter().map(|(suite, error)| ProblemRow {
            suite: suite.clone(),
            test: None,
            problem: format!("config error: {error}"),
        });

        let inconclusive = self
            .verdicts
            .iter()
            .filter_map(|(suite, test, verdict)| match verdict {
                Verdict::Inconclusive { reason } => Some(ProblemRow {
                    suite: suite.clone(),
                    test: Some(test.clone()),
                    problem: reason.clone(),
                }),
                _ => None,
            });

        config.chain(inconclusive).collect()
    }

    fn print_table<T: tabled::Tabled>(title: &str, rows: &[T]) {
        println!("\n{title}");
        let mut table = Table::new(rows);
        table.with(Style::modern());
        println!("{table}");
    }
}

impl ReportCollector for SummaryReportCollector {
    fn add_verdict(&mut self, suite: &str, test: &str, verdict: &Verdict) {
        self.verdicts
            .push((suite.to_string(), test.to_string(), verdict.clone()));
    }

    fn add_config_error(&mut self, suite: &str, error: &ConfigError) {
        self.config_errors.push((suite.to_string(), error.clone()));
    }

    fn finalize(&self) -> anyhow::Result<()> {
        if !self.verdicts.is_empty() {
            Self::print_table("Results", &self.result_rows());
            Self::print_table("Summary by suite", &self.suite_rows());
        }

        let problems = self.problem_rows();
        if !problems.is_empty() {
            Self::print_table("Infrastructure problems", &problems);
        }

        Ok(())
    }
}
