use std::time::Duration;

use serde::Serialize;

use crate::document::Document;

/// A structured error reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[display("({code}) {name}: {message}")]
pub struct CommandError {
    /// Numeric error code, e.g. `2`.
    pub code: i32,
    /// Symbolic code name, e.g. `BadValue`.
    pub name: String,
    /// Human-readable message.
    pub message: String,
}

impl CommandError {
    pub fn new(code: i32, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Why a test case that did run is considered failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Failure {
    /// The instruction reported a structured backend error.
    #[display("command error {_0}")]
    Command(CommandError),
    /// The instruction did not finish within the configured timeout.
    #[display("timed out after {_0:?}")]
    Timeout(Duration),
    /// The instruction exited unsuccessfully without a structured error.
    #[display("exited with code {}: {stderr}", exit_code(*code))]
    NonZeroExit { code: Option<i32>, stderr: String },
}

/// The terminal state of one test case against one backend.
///
/// `Aborted` means the case never produced an observation (setup failed, the process could not be
/// started, or the run was cancelled before the case started). It is an infrastructure problem and
/// is never compared.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum CaseOutcome {
    #[display("succeeded with {_0}")]
    Succeeded(Document),
    #[display("failed: {_0}")]
    Failed(Failure),
    #[display("aborted: {_0}")]
    Aborted(String),
}

/// What one backend is documented to do for a test case.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Expectation {
    /// Any successful result.
    #[display("success")]
    Success,
    /// Success with exactly this document.
    #[display("success with {_0}")]
    Document(Document),
    /// Exactly this structured error.
    #[display("command error {_0}")]
    Error(CommandError),
}

/// A documented divergence: the outcome each backend is expected to produce for one test case.
///
/// When present, each side is checked against its own expectation instead of against the other
/// side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedOutcomes {
    pub reference: Expectation,
    pub under_test: Expectation,
}

fn exit_code(code: Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

impl CaseOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self, CaseOutcome::Aborted(_))
    }
}

impl From<Result<Document, CommandError>> for CaseOutcome {
    fn from(result: Result<Document, CommandError>) -> Self {
        match result {
            Ok(doc) => CaseOutcome::Succeeded(doc),
            Err(err) => CaseOutcome::Failed(Failure::Command(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_command_error() {
        let err = CommandError::new(2, "BadValue", "NaN is not supported");
        assert_eq!("(2) BadValue: NaN is not supported", err.to_string());
    }

    #[test]
    fn display_non_zero_exit_without_code() {
        let failure = Failure::NonZeroExit {
            code: None,
            stderr: "killed".to_string(),
        };
        assert_eq!("exited with code none: killed", failure.to_string());
    }

    #[test]
    fn display_expectations() {
        assert_eq!("success", Expectation::Success.to_string());
        assert_eq!(
            "command error (2) BadValue: NaN is not supported",
            Expectation::Error(CommandError::new(2, "BadValue", "NaN is not supported"))
                .to_string()
        );
    }

    #[test]
    fn backend_result_into_outcome() {
        let outcome: CaseOutcome = Err(CommandError::new(2, "BadValue", "nope")).into();
        assert_eq!(
            CaseOutcome::Failed(Failure::Command(CommandError::new(2, "BadValue", "nope"))),
            outcome
        );
        assert!(!outcome.is_aborted());
    }
}
