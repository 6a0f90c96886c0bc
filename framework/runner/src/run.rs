use std::time::Duration;

use anyhow::Context;

use crate::backend::Backends;
use crate::cli::DanceCli;
use crate::engine::{Engine, SuiteVerdicts};
use crate::executor::Executor;
use crate::process::ProcessInvoker;
use crate::progress::Progress;
use crate::projects::{load_projects, Projects};
use crate::report::{JsonReportCollector, ReportCollector, RunSummary, SummaryReportCollector};
use crate::shutdown::start_shutdown_listener;

/// Load the selected projects, run every suite against both backends and report the verdicts.
///
/// Suites that fail to load, divergences and inconclusive cases are reported and counted in the
/// returned [RunSummary] rather than returned as errors. An error is returned if the run could not
/// be performed at all, a report could not be written, or the run was interrupted.
pub fn run(cli: DanceCli) -> anyhow::Result<RunSummary> {
    let run_id = cli.run_id.unwrap_or_else(|| nanoid::nanoid!());
    let backends = Backends {
        reference: cli.reference,
        under_test: cli.target,
    };

    log::info!(
        "Starting run {run_id}: reference {}, under test {}",
        backends.reference,
        backends.under_test
    );

    let projects = load_projects(&cli.projects_dir, &cli.projects)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime)?;
    let executor = Executor::new(runtime, shutdown_handle.clone());

    let total_cases: usize = projects
        .suites
        .iter()
        .map(|s| s.params().test_names().len())
        .sum();
    // Every case runs once per backend.
    let progress = Progress::new(2 * total_cases as u64, !cli.no_progress);

    let engine = Engine::new(ProcessInvoker, shutdown_handle)
        .with_base_dir(&cli.projects_dir)
        .with_timeout(Duration::from_secs(cli.timeout))
        .with_jobs(cli.jobs)
        .with_progress(progress.clone());

    let results = executor.execute_in_place(engine.run_all(&projects.suites, &backends));
    progress.finish();

    let mut summary = RunSummary::default();
    let mut collectors: Vec<Box<dyn ReportCollector>> =
        vec![Box::new(SummaryReportCollector::new())];
    if let Some(path) = &cli.report {
        collectors.push(Box::new(JsonReportCollector::new(
            path,
            run_id.as_str(),
            backends.clone(),
        )));
    }

    for collector in collectors.iter_mut() {
        report(collector.as_mut(), &projects, &results)?;
    }
    report(&mut summary, &projects, &results)?;

    executor.check_shutdown()?;

    Ok(summary)
}

fn report(
    collector: &mut dyn ReportCollector,
    projects: &Projects,
    results: &[SuiteVerdicts],
) -> anyhow::Result<()> {
    for (suite, error) in &projects.errors {
        collector.add_config_error(suite, error);
    }
    for suite in results {
        for case in &suite.verdicts {
            collector.add_verdict(&suite.suite, &case.test, &case.verdict);
        }
    }

    collector.finalize()
}
