use std::path::{Path, PathBuf};
use std::time::Duration;

use dance_compare::prelude::{compare, Policy, Verdict};
use dance_config::prelude::{Instruction, Suite, TestCase, Tolerance};
use dance_core::prelude::{CaseOutcome, ShutdownHandle};
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use serde::Serialize;

use crate::backend::{Backend, Backends};
use crate::payload::outcome_from_output;
use crate::process::{ExecutionError, Invocation, Invoke};
use crate::progress::Progress;

/// Default bound on a single instruction.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Reason recorded for cases that had not started when a shutdown was requested.
pub const CANCELLED_BY_SHUTDOWN: &str = "cancelled by shutdown";

/// Lifecycle of one test case against one backend.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseState {
    Pending,
    Running,
    Done(CaseOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal case transition from {from} to {to}")]
pub struct TransitionError {
    from: &'static str,
    to: &'static str,
}

impl CaseState {
    fn name(&self) -> &'static str {
        match self {
            CaseState::Pending => "pending",
            CaseState::Running => "running",
            CaseState::Done(_) => "done",
        }
    }

    fn transition(&mut self, to: CaseState) -> Result<(), TransitionError> {
        let legal = matches!(
            (&*self, &to),
            (CaseState::Pending, CaseState::Running)
                | (CaseState::Running, CaseState::Done(_))
                | (CaseState::Pending, CaseState::Done(CaseOutcome::Aborted(_)))
        );
        if !legal {
            return Err(TransitionError {
                from: self.name(),
                to: to.name(),
            });
        }

        *self = to;
        Ok(())
    }

    /// `Pending -> Running`.
    pub fn start(&mut self) -> Result<(), TransitionError> {
        self.transition(CaseState::Running)
    }

    /// `Running -> Done`.
    pub fn finish(&mut self, outcome: CaseOutcome) -> Result<(), TransitionError> {
        if matches!(self, CaseState::Pending) {
            return Err(TransitionError {
                from: self.name(),
                to: "done",
            });
        }
        self.transition(CaseState::Done(outcome))
    }

    /// `Pending -> Done(Aborted)`, for cases that will never run.
    pub fn abort(&mut self, reason: impl Into<String>) -> Result<(), TransitionError> {
        if !matches!(self, CaseState::Pending) {
            return Err(TransitionError {
                from: self.name(),
                to: "aborted",
            });
        }
        self.transition(CaseState::Done(CaseOutcome::Aborted(reason.into())))
    }
}

/// The states of every case of one suite against one backend, in declared order.
#[derive(Debug)]
struct SuiteState {
    cases: Mutex<Vec<(String, CaseState)>>,
}

impl SuiteState {
    fn new(cases: &[TestCase]) -> Self {
        Self {
            cases: Mutex::new(
                cases
                    .iter()
                    .map(|c| (c.name.clone(), CaseState::Pending))
                    .collect(),
            ),
        }
    }

    fn update(
        &self,
        index: usize,
        f: impl FnOnce(&mut CaseState) -> Result<(), TransitionError>,
    ) {
        let mut cases = self.cases.lock();
        let (name, state) = &mut cases[index];
        if let Err(e) = f(state) {
            log::error!("Test case {name}: {e}");
        }
    }

    fn abort_pending(&self, reason: &str) {
        for (_, state) in self.cases.lock().iter_mut() {
            if matches!(state, CaseState::Pending) {
                // Cannot fail from Pending.
                let _ = state.abort(reason);
            }
        }
    }

    fn into_results(self) -> Vec<CaseResult> {
        self.cases
            .into_inner()
            .into_iter()
            .map(|(test, state)| {
                let outcome = match state {
                    CaseState::Done(outcome) => outcome,
                    other => CaseOutcome::Aborted(format!(
                        "test case never finished, left {}",
                        other.name()
                    )),
                };
                CaseResult { test, outcome }
            })
            .collect()
    }
}

/// The outcome of one test case against one backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseResult {
    pub test: String,
    pub outcome: CaseOutcome,
}

/// The verdict for one test case across both backends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseVerdict {
    pub test: String,
    pub verdict: Verdict,
}

/// Verdicts for one suite, in declared order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteVerdicts {
    pub suite: String,
    pub verdicts: Vec<CaseVerdict>,
}

/// Executes suites against backends and compares the results.
pub struct Engine<I: Invoke> {
    invoker: I,
    shutdown: ShutdownHandle,
    base_dir: PathBuf,
    timeout: Duration,
    jobs: Option<usize>,
    progress: Progress,
}

impl<I: Invoke> Engine<I> {
    pub fn new(invoker: I, shutdown: ShutdownHandle) -> Self {
        Self {
            invoker,
            shutdown,
            base_dir: PathBuf::from("."),
            timeout: DEFAULT_TIMEOUT,
            jobs: None,
            progress: Progress::hidden(),
        }
    }

    /// Directory that relative suite `dir`s are resolved against.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Limit how many cases of one suite run at once on one backend. `None` runs them all at once.
    pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    fn invocation(&self, dir: &Path, instruction: Instruction, backend: &Backend) -> Invocation {
        Invocation {
            dir: dir.to_path_buf(),
            instruction,
            env: backend.env(),
            timeout: self.timeout,
        }
    }

    /// Run every case of `suite` against one backend.
    ///
    /// Never fails: problems running a case are recorded in its outcome.
    pub async fn run_suite(&self, suite: &Suite, backend: &Backend) -> Vec<CaseResult> {
        let params = suite.params();
        let dir = self.base_dir.join(params.dir());
        let cases = params.test_cases();
        let state = SuiteState::new(&cases);

        log::info!(
            "Running suite {} ({}) against {}",
            suite.name(),
            params.kind(),
            backend.name
        );

        if self.shutdown.is_shutdown() {
            log::info!("Suite {} cancelled on {}", suite.name(), backend.name);
            state.abort_pending(CANCELLED_BY_SHUTDOWN);
            self.progress.skip(cases.len() as u64);
            return state.into_results();
        }

        if let Some(setup) = params.setup() {
            if let Some(reason) = self.run_setup(&dir, setup, backend).await {
                log::warn!("Setup of suite {} failed on {}: {reason}", suite.name(), backend.name);
                state.abort_pending(&format!("setup failed: {reason}"));
                self.progress.skip(cases.len() as u64);
                return state.into_results();
            }
        }

        let jobs = self.jobs.unwrap_or(cases.len()).max(1);
        let state_ref = &state;

        stream::iter(cases.into_iter().enumerate())
            .map(|(index, case)| {
                let dir = dir.as_path();
                async move {
                    if self.shutdown.is_shutdown() {
                        state_ref.update(index, |s| s.abort(CANCELLED_BY_SHUTDOWN));
                        self.progress.skip(1);
                        return;
                    }

                    state_ref.update(index, CaseState::start);
                    let outcome = self.run_case(dir, &case, backend).await;
                    log::debug!(
                        "{}/{} on {}: {outcome}",
                        suite.name(),
                        case.name,
                        backend.name
                    );
                    state_ref.update(index, |s| s.finish(outcome));
                    self.progress.case_done(suite.name(), &case.name);
                }
            })
            .buffered(jobs)
            .collect::<Vec<()>>()
            .await;

        state.into_results()
    }

    /// Returns the failure reason, if any.
    async fn run_setup(&self, dir: &Path, setup: Instruction, backend: &Backend) -> Option<String> {
        let invocation = self.invocation(dir, setup, backend);
        match self.invoker.invoke(&invocation).await {
            Ok(output) if output.success => None,
            Ok(output) => Some(
                ExecutionError::NonZeroExit {
                    code: output.code,
                    stderr: output.stderr.trim().to_string(),
                }
                .to_string(),
            ),
            Err(e) => Some(e.to_string()),
        }
    }

    async fn run_case(&self, dir: &Path, case: &TestCase, backend: &Backend) -> CaseOutcome {
        let invocation = self.invocation(dir, case.instruction.clone(), backend);

        match self.invoker.invoke(&invocation).await {
            Ok(output) => outcome_from_output(&output),
            Err(e) => e.into(),
        }
    }

    /// Run `suite` against both backends concurrently and compare each case.
    pub async fn run_differential(&self, suite: &Suite, backends: &Backends) -> SuiteVerdicts {
        let (reference, under_test) = futures::join!(
            self.run_suite(suite, &backends.reference),
            self.run_suite(suite, &backends.under_test)
        );

        let verdicts = reference
            .into_iter()
            .zip(under_test)
            .map(|(r, u)| {
                let policy = policy_for(suite.tolerance(), &r.test);
                let verdict = compare(&r.outcome, &u.outcome, &policy);
                match &verdict {
                    Verdict::Match => log::debug!("{}/{}: match", suite.name(), r.test),
                    Verdict::Diverge(d) => log::warn!("{}/{}: diverge: {d}", suite.name(), r.test),
                    Verdict::Inconclusive { reason } => {
                        log::error!("{}/{}: inconclusive: {reason}", suite.name(), r.test)
                    }
                }
                CaseVerdict {
                    test: r.test,
                    verdict,
                }
            })
            .collect();

        SuiteVerdicts {
            suite: suite.name().to_string(),
            verdicts,
        }
    }

    /// Run independent suites concurrently. Results are in the order of `suites`.
    pub async fn run_all(&self, suites: &[Suite], backends: &Backends) -> Vec<SuiteVerdicts> {
        futures::future::join_all(suites.iter().map(|s| self.run_differential(s, backends))).await
    }
}

/// The comparison policy for one test case of a suite.
pub fn policy_for(tolerance: &Tolerance, test: &str) -> Policy {
    let policy = tolerance
        .ignore_fields()
        .iter()
        .fold(Policy::strict(), |policy, field| policy.ignoring(field.clone()));

    let policy = match tolerance.expected_message(test) {
        Some(message) => policy.with_literal_message(message),
        None => policy,
    };

    match tolerance.expected_outcomes(test) {
        Some(expected) => policy.expecting(expected.clone()),
        None => policy,
    }
}
