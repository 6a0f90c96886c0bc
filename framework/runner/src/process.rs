use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use dance_config::prelude::Instruction;
use dance_core::prelude::{CaseOutcome, Failure};
use futures::future::BoxFuture;
use futures::FutureExt;

/// One isolated execution of an instruction.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Working directory. Must exist.
    pub dir: PathBuf,
    pub instruction: Instruction,
    /// Extra environment variables for the child process.
    pub env: Vec<(String, String)>,
    pub timeout: Duration,
}

/// What a finished process produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, if the process exited normally.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The process never ran: missing working directory, unknown program, spawn failure.
    #[error("process could not be started: {0}")]
    ProcessStartFailure(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("exited with code {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
}

/// A process that never started is an infrastructure problem; one that ran and failed is an
/// observation.
impl From<ExecutionError> for CaseOutcome {
    fn from(err: ExecutionError) -> Self {
        match err {
            ExecutionError::ProcessStartFailure(reason) => CaseOutcome::Aborted(reason),
            ExecutionError::Timeout(timeout) => CaseOutcome::Failed(Failure::Timeout(timeout)),
            ExecutionError::NonZeroExit { code, stderr } => {
                CaseOutcome::Failed(Failure::NonZeroExit { code, stderr })
            }
        }
    }
}

/// Runs instructions. Implementations must isolate invocations from each other.
pub trait Invoke: Send + Sync {
    /// Execute the invocation. Only [ExecutionError::ProcessStartFailure] and
    /// [ExecutionError::Timeout] are returned here; an unsuccessful exit is reported through
    /// [ProcessOutput].
    fn invoke<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> BoxFuture<'a, Result<ProcessOutput, ExecutionError>>;
}

/// Runs instructions as child processes.
///
/// Shell lines are run with `sh -c`. Programs are resolved relative to the working directory if
/// they contain a path separator, otherwise on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessInvoker;

impl Invoke for ProcessInvoker {
    fn invoke<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> BoxFuture<'a, Result<ProcessOutput, ExecutionError>> {
        async move {
            let dir = invocation.dir.as_path();
            if !dir.is_dir() {
                return Err(ExecutionError::ProcessStartFailure(format!(
                    "working directory '{}' does not exist",
                    dir.display()
                )));
            }

            let mut cmd = match &invocation.instruction {
                Instruction::Shell(line) => {
                    let mut cmd = tokio::process::Command::new("sh");
                    cmd.arg("-c").arg(line);
                    cmd
                }
                Instruction::Program { program, args } => {
                    let mut cmd = tokio::process::Command::new(resolve_program(dir, program)?);
                    cmd.args(args);
                    cmd
                }
            };

            cmd.current_dir(dir)
                .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);

            log::trace!("Running `{}` in {}", invocation.instruction, dir.display());

            let child = cmd.spawn().map_err(|e| {
                ExecutionError::ProcessStartFailure(format!(
                    "failed to start `{}`: {e}",
                    invocation.instruction
                ))
            })?;

            // Dropping the child on timeout kills it.
            match tokio::time::timeout(invocation.timeout, child.wait_with_output()).await {
                Ok(Ok(output)) => Ok(ProcessOutput {
                    code: output.status.code(),
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }),
                Ok(Err(e)) => Err(ExecutionError::ProcessStartFailure(format!(
                    "failed to wait for `{}`: {e}",
                    invocation.instruction
                ))),
                Err(_) => Err(ExecutionError::Timeout(invocation.timeout)),
            }
        }
        .boxed()
    }
}

fn resolve_program(dir: &Path, program: &str) -> Result<PathBuf, ExecutionError> {
    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        let path = dir.join(program);
        if !path.exists() {
            return Err(ExecutionError::ProcessStartFailure(format!(
                "program '{}' does not exist",
                path.display()
            )));
        }
        return Ok(path);
    }

    which::which(program).map_err(|e| {
        ExecutionError::ProcessStartFailure(format!("program '{program}' not found in PATH: {e}"))
    })
}
