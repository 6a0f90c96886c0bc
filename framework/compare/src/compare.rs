use dance_core::prelude::{CaseOutcome, CommandError, Expectation, ExpectedOutcomes, Failure};

use crate::diff::diff_documents;
use crate::policy::{MessageRule, Policy};
use crate::verdict::{Divergence, Verdict};

/// Compare the outcome of one test case on the reference backend with the outcome on the backend
/// under test.
///
/// Aborted outcomes are never compared: if either side aborted the verdict is
/// [Verdict::Inconclusive]. Everything else is compared strictly, relaxed only by `policy`. If
/// `policy` documents the expected outcome of each backend, each side is checked against its
/// expectation instead.
pub fn compare(reference: &CaseOutcome, under_test: &CaseOutcome, policy: &Policy) -> Verdict {
    let reason = match (reference, under_test) {
        (CaseOutcome::Aborted(r), CaseOutcome::Aborted(u)) => {
            return Verdict::Inconclusive {
                reason: format!("both backends aborted: reference: {r}; under test: {u}"),
            };
        }
        (CaseOutcome::Aborted(r), _) => {
            return Verdict::Inconclusive {
                reason: format!("reference backend aborted: {r}"),
            };
        }
        (_, CaseOutcome::Aborted(u)) => {
            return Verdict::Inconclusive {
                reason: format!("backend under test aborted: {u}"),
            };
        }
        _ => match policy.expected() {
            Some(expected) => diff_expected(reference, under_test, expected, policy),
            None => diff_outcomes(reference, under_test, policy),
        },
    };

    match reason {
        None => Verdict::Match,
        Some(reason) => Verdict::Diverge(Divergence {
            reason,
            reference: reference.clone(),
            under_test: under_test.clone(),
        }),
    }
}

fn diff_outcomes(
    reference: &CaseOutcome,
    under_test: &CaseOutcome,
    policy: &Policy,
) -> Option<String> {
    match (reference, under_test) {
        (CaseOutcome::Succeeded(a), CaseOutcome::Succeeded(b)) => diff_documents(a, b, policy),
        (CaseOutcome::Failed(a), CaseOutcome::Failed(b)) => diff_failures(a, b, policy),
        (CaseOutcome::Succeeded(_), CaseOutcome::Failed(f)) => Some(format!(
            "reference backend succeeded, backend under test failed: {f}"
        )),
        (CaseOutcome::Failed(f), CaseOutcome::Succeeded(_)) => Some(format!(
            "reference backend failed: {f}, backend under test succeeded"
        )),
        (a, b) => Some(format!("reference backend {a}, backend under test {b}")),
    }
}

/// Check each side against its documented outcome. The sides are not compared with each other.
fn diff_expected(
    reference: &CaseOutcome,
    under_test: &CaseOutcome,
    expected: &ExpectedOutcomes,
    policy: &Policy,
) -> Option<String> {
    diff_expectation(reference, &expected.reference, policy)
        .map(|diff| format!("reference backend: {diff}"))
        .or_else(|| {
            diff_expectation(under_test, &expected.under_test, policy)
                .map(|diff| format!("backend under test: {diff}"))
        })
}

fn diff_expectation(
    outcome: &CaseOutcome,
    expectation: &Expectation,
    policy: &Policy,
) -> Option<String> {
    match (expectation, outcome) {
        (Expectation::Success, CaseOutcome::Succeeded(_)) => None,
        (Expectation::Document(expected), CaseOutcome::Succeeded(actual)) => {
            diff_documents(expected, actual, policy)
                .map(|diff| format!("document differs from expected: {diff}"))
        }
        (Expectation::Error(expected), CaseOutcome::Failed(Failure::Command(actual))) => {
            diff_errors(expected, actual, &MessageRule::Live)
        }
        (expectation, outcome) => Some(format!("expected {expectation}, got {outcome}")),
    }
}

fn diff_failures(reference: &Failure, under_test: &Failure, policy: &Policy) -> Option<String> {
    match (reference, under_test) {
        (Failure::Command(a), Failure::Command(b)) => diff_errors(a, b, policy.message()),
        (Failure::Timeout(_), Failure::Timeout(_)) => None,
        (Failure::NonZeroExit { code: a, .. }, Failure::NonZeroExit { code: b, .. }) => {
            (a != b).then(|| format!("exit code {a:?} vs {b:?}"))
        }
        (a, b) => Some(format!("reference backend failed: {a}, backend under test failed: {b}")),
    }
}

fn diff_errors(
    reference: &CommandError,
    under_test: &CommandError,
    rule: &MessageRule,
) -> Option<String> {
    if reference.code != under_test.code {
        return Some(format!(
            "error code {} vs {}",
            reference.code, under_test.code
        ));
    }

    if reference.name != under_test.name {
        return Some(format!(
            "error name {:?} vs {:?}",
            reference.name, under_test.name
        ));
    }

    match rule {
        MessageRule::Live => (reference.message != under_test.message).then(|| {
            format!(
                "error message {:?} vs {:?}",
                reference.message, under_test.message
            )
        }),
        MessageRule::Literal(expected) => (&under_test.message != expected).then(|| {
            format!(
                "error message {:?} does not match expected {:?}",
                under_test.message, expected
            )
        }),
    }
}
