use dance_core::prelude::CaseOutcome;
use serde::Serialize;

/// The result of comparing one test case across both backends.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// Both backends behaved the same, within the policy.
    #[display("match")]
    Match,
    /// A real behavioural difference between the backends.
    #[display("diverge: {_0}")]
    Diverge(Divergence),
    /// At least one side never produced an observation, so nothing could be compared.
    #[display("inconclusive: {reason}")]
    Inconclusive { reason: String },
}

/// Details of a divergence, including both raw outcomes for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, derive_more::Display)]
#[display("{reason}")]
pub struct Divergence {
    pub reason: String,
    pub reference: CaseOutcome,
    pub under_test: CaseOutcome,
}
