use std::collections::BTreeMap;

use dance_core::prelude::ExpectedOutcomes;

use crate::params::RunnerParams;

/// A named collection of test cases bound to one set of runner parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Suite {
    name: String,
    params: RunnerParams,
    tolerance: Tolerance,
}

impl Suite {
    pub fn new(name: impl Into<String>, params: RunnerParams, tolerance: Tolerance) -> Self {
        Self {
            name: name.into(),
            params,
            tolerance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &RunnerParams {
        &self.params
    }

    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }
}

/// Documented, allowed divergences for a suite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tolerance {
    ignore_fields: Vec<String>,
    messages: BTreeMap<String, String>,
    expected: BTreeMap<String, ExpectedOutcomes>,
}

impl Tolerance {
    pub fn new(
        ignore_fields: Vec<String>,
        messages: BTreeMap<String, String>,
        expected: BTreeMap<String, ExpectedOutcomes>,
    ) -> Self {
        Self {
            ignore_fields,
            messages,
            expected,
        }
    }

    /// Dotted field paths excluded from document comparison.
    pub fn ignore_fields(&self) -> &[String] {
        &self.ignore_fields
    }

    /// The literal error message the backend under test must return for `test`, if the reference
    /// message is not itself under test.
    pub fn expected_message(&self, test: &str) -> Option<&str> {
        self.messages.get(test).map(String::as_str)
    }

    /// The documented outcome of `test` on each backend, when the backend under test is allowed
    /// to behave differently from the reference.
    pub fn expected_outcomes(&self, test: &str) -> Option<&ExpectedOutcomes> {
        self.expected.get(test)
    }
}
