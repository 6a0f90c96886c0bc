//! Format-shaped structures for project documents.
//!
//! Every field is optional here so that validation can name exactly what is missing. Keys that are
//! not listed are ignored.

use std::collections::{BTreeMap, HashSet};

use dance_core::prelude::{CommandError, Document, Expectation, ExpectedOutcomes};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;
use crate::kind::RunnerKind;
use crate::params::{
    CommandParams, CommandTest, GoTest, GoTestParams, JsTest, JsTestParams, RunnerParams,
    YcsbParams, YcsbWorkload,
};
use crate::suite::Tolerance;

/// A YAML scalar read as text, so that `cmd: true` or `name: 1` load as the strings they spell.
///
/// Sequences, mappings and tagged values are rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Scalar(String);

impl Scalar {
    pub fn into_string(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_yaml::Value::deserialize(deserializer)? {
            serde_yaml::Value::String(s) => Ok(Scalar(s)),
            serde_yaml::Value::Bool(b) => Ok(Scalar(b.to_string())),
            serde_yaml::Value::Number(n) => Ok(Scalar(n.to_string())),
            serde_yaml::Value::Null => Err(D::Error::custom("invalid type: null, expected a scalar")),
            serde_yaml::Value::Sequence(_) => {
                Err(D::Error::custom("invalid type: sequence, expected a scalar"))
            }
            serde_yaml::Value::Mapping(_) => {
                Err(D::Error::custom("invalid type: map, expected a scalar"))
            }
            serde_yaml::Value::Tagged(tagged) => Err(D::Error::custom(format!(
                "invalid type: tagged value {}, expected a scalar",
                tagged.tag
            ))),
        }
    }
}

/// Top level of a project document.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawProject {
    pub runner: Option<Scalar>,
    pub params: Option<serde_yaml::Value>,
    pub compare: Option<RawCompare>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCompare {
    ignore_fields: Option<Vec<Scalar>>,
    messages: Option<BTreeMap<Scalar, Scalar>>,
    expect: Option<BTreeMap<Scalar, RawExpected>>,
}

impl RawCompare {
    pub fn convert(self, params: &RunnerParams) -> Result<Tolerance, ConfigError> {
        let names = params.test_names();
        let known = |section: &str, test: &str| {
            if names.contains(&test) {
                Ok(())
            } else {
                Err(ConfigError::malformed(format!(
                    "compare.{section} refers to unknown test {test:?}"
                )))
            }
        };

        let ignore_fields = self.ignore_fields.unwrap_or_default();
        for (i, field) in ignore_fields.iter().enumerate() {
            if field.0.trim().is_empty() {
                return Err(ConfigError::missing(format!("compare.ignore_fields[{i}]")));
            }
        }

        let mut messages = BTreeMap::new();
        for (test, message) in self.messages.unwrap_or_default() {
            known("messages", &test.0)?;
            messages.insert(test.into_string(), message.into_string());
        }

        let mut expected = BTreeMap::new();
        for (test, raw) in self.expect.unwrap_or_default() {
            known("expect", &test.0)?;
            let outcomes = raw.convert(&format!("compare.expect.{}", test.0))?;
            expected.insert(test.into_string(), outcomes);
        }

        Ok(Tolerance::new(
            ignore_fields.into_iter().map(Scalar::into_string).collect(),
            messages,
            expected,
        ))
    }
}

/// The documented outcome of one test on each backend.
#[derive(Debug, Deserialize)]
pub(crate) struct RawExpected {
    reference: Option<RawExpectation>,
    under_test: Option<RawExpectation>,
}

impl RawExpected {
    fn convert(self, path: &str) -> Result<ExpectedOutcomes, ConfigError> {
        let reference = self
            .reference
            .ok_or_else(|| ConfigError::missing(format!("{path}.reference")))?
            .convert(&format!("{path}.reference"))?;
        let under_test = self
            .under_test
            .ok_or_else(|| ConfigError::missing(format!("{path}.under_test")))?
            .convert(&format!("{path}.under_test"))?;

        Ok(ExpectedOutcomes {
            reference,
            under_test,
        })
    }
}

/// Either the keyword `success` or a mapping with exactly one of `document` or `error`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawExpectation {
    Keyword(Scalar),
    Outcome {
        document: Option<serde_json::Value>,
        error: Option<RawCommandError>,
    },
}

impl RawExpectation {
    const SUCCESS: &'static str = "success";

    fn convert(self, path: &str) -> Result<Expectation, ConfigError> {
        match self {
            RawExpectation::Keyword(keyword) if keyword.0 == Self::SUCCESS => {
                Ok(Expectation::Success)
            }
            RawExpectation::Keyword(keyword) => Err(ConfigError::malformed(format!(
                "{path}: unknown expectation {:?}, expected {:?}, document or error",
                keyword.0,
                Self::SUCCESS
            ))),
            RawExpectation::Outcome {
                document: Some(document),
                error: None,
            } => Document::from_json(document)
                .map(Expectation::Document)
                .ok_or_else(|| ConfigError::malformed(format!("{path}.document must be a map"))),
            RawExpectation::Outcome {
                document: None,
                error: Some(error),
            } => error.convert(&format!("{path}.error")).map(Expectation::Error),
            RawExpectation::Outcome { .. } => Err(ConfigError::malformed(format!(
                "{path} must have exactly one of document or error"
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawCommandError {
    code: Option<i32>,
    name: Option<Scalar>,
    message: Option<Scalar>,
}

impl RawCommandError {
    fn convert(self, path: &str) -> Result<CommandError, ConfigError> {
        let code = self
            .code
            .ok_or_else(|| ConfigError::missing(format!("{path}.code")))?;
        let name = required(self.name, format!("{path}.name"))?;
        let message = required(self.message, format!("{path}.message"))?;

        Ok(CommandError::new(code, name, message))
    }
}

/// Runner parameters as they appear under `params`, for one runner kind.
pub(crate) trait RawRunnerParams: DeserializeOwned {
    fn convert(self) -> Result<RunnerParams, ConfigError>;
}

/// A test entry: a name plus one kind-specific key.
trait RawTest {
    /// The document key of the kind-specific value, for error messages.
    const KEY: &'static str;

    fn into_parts(self) -> (Option<Scalar>, Option<Scalar>);
}

/// Deserialize `params` into the raw shape for `kind` and convert it.
pub(crate) fn convert_params(
    kind: RunnerKind,
    params: serde_yaml::Value,
) -> Result<RunnerParams, ConfigError> {
    match kind {
        RunnerKind::Command => parse::<RawCommandParams>(params),
        RunnerKind::NativeTest => parse::<RawGoTestParams>(params),
        RunnerKind::ScriptedTest => parse::<RawJsTestParams>(params),
        RunnerKind::Workload => parse::<RawYcsbParams>(params),
    }
}

fn parse<T: RawRunnerParams>(params: serde_yaml::Value) -> Result<RunnerParams, ConfigError> {
    let raw: T = serde_yaml::from_value(params).map_err(ConfigError::malformed)?;
    raw.convert()
}

/// `command` runner parameters in the project document.
#[derive(Debug, Deserialize)]
struct RawCommandParams {
    dir: Option<Scalar>,
    setup: Option<Scalar>,
    tests: Option<Vec<RawCommandTest>>,
}

#[derive(Debug, Deserialize)]
struct RawCommandTest {
    name: Option<Scalar>,
    cmd: Option<Scalar>,
}

impl RawTest for RawCommandTest {
    const KEY: &'static str = "cmd";

    fn into_parts(self) -> (Option<Scalar>, Option<Scalar>) {
        (self.name, self.cmd)
    }
}

impl RawRunnerParams for RawCommandParams {
    fn convert(self) -> Result<RunnerParams, ConfigError> {
        let dir = required(self.dir, "dir")?;
        let tests = convert_tests(self.tests, CommandTest::new)?;

        Ok(RunnerParams::Command(CommandParams::new(
            dir,
            optional(self.setup),
            tests,
        )))
    }
}

/// `gotest` runner parameters in the project document.
#[derive(Debug, Deserialize)]
struct RawGoTestParams {
    dir: Option<Scalar>,
    setup: Option<Scalar>,
    args: Option<Vec<Scalar>>,
    tests: Option<Vec<RawGoTest>>,
}

#[derive(Debug, Deserialize)]
struct RawGoTest {
    name: Option<Scalar>,
    run: Option<Scalar>,
}

impl RawTest for RawGoTest {
    const KEY: &'static str = "run";

    fn into_parts(self) -> (Option<Scalar>, Option<Scalar>) {
        (self.name, self.run)
    }
}

impl RawRunnerParams for RawGoTestParams {
    fn convert(self) -> Result<RunnerParams, ConfigError> {
        let dir = required(self.dir, "dir")?;
        let tests = convert_tests(self.tests, GoTest::new)?;

        Ok(RunnerParams::NativeTest(GoTestParams::new(
            dir,
            optional(self.setup),
            scalars(self.args),
            tests,
        )))
    }
}

/// `jstest` runner parameters in the project document.
#[derive(Debug, Deserialize)]
struct RawJsTestParams {
    dir: Option<Scalar>,
    setup: Option<Scalar>,
    shell: Option<Scalar>,
    args: Option<Vec<Scalar>>,
    tests: Option<Vec<RawJsTest>>,
}

#[derive(Debug, Deserialize)]
struct RawJsTest {
    name: Option<Scalar>,
    file: Option<Scalar>,
}

impl RawTest for RawJsTest {
    const KEY: &'static str = "file";

    fn into_parts(self) -> (Option<Scalar>, Option<Scalar>) {
        (self.name, self.file)
    }
}

impl RawRunnerParams for RawJsTestParams {
    fn convert(self) -> Result<RunnerParams, ConfigError> {
        let dir = required(self.dir, "dir")?;
        let tests = convert_tests(self.tests, JsTest::new)?;

        Ok(RunnerParams::ScriptedTest(JsTestParams::new(
            dir,
            optional(self.setup),
            optional(self.shell).unwrap_or_else(|| JsTestParams::DEFAULT_SHELL.to_string()),
            scalars(self.args),
            tests,
        )))
    }
}

/// `ycsb` runner parameters in the project document.
#[derive(Debug, Deserialize)]
struct RawYcsbParams {
    dir: Option<Scalar>,
    setup: Option<Scalar>,
    bin: Option<Scalar>,
    database: Option<Scalar>,
    tests: Option<Vec<RawYcsbWorkload>>,
}

#[derive(Debug, Deserialize)]
struct RawYcsbWorkload {
    name: Option<Scalar>,
    workload: Option<Scalar>,
}

impl RawTest for RawYcsbWorkload {
    const KEY: &'static str = "workload";

    fn into_parts(self) -> (Option<Scalar>, Option<Scalar>) {
        (self.name, self.workload)
    }
}

impl RawRunnerParams for RawYcsbParams {
    fn convert(self) -> Result<RunnerParams, ConfigError> {
        let dir = required(self.dir, "dir")?;
        let tests = convert_tests(self.tests, YcsbWorkload::new)?;

        Ok(RunnerParams::Workload(YcsbParams::new(
            dir,
            optional(self.setup),
            optional(self.bin).unwrap_or_else(|| YcsbParams::DEFAULT_BIN.to_string()),
            optional(self.database).unwrap_or_else(|| YcsbParams::DEFAULT_DATABASE.to_string()),
            tests,
        )))
    }
}

/// Blank strings count as absent.
fn required(value: Option<Scalar>, field: impl Into<String>) -> Result<String, ConfigError> {
    optional(value).ok_or_else(|| ConfigError::missing(field))
}

fn optional(value: Option<Scalar>) -> Option<String> {
    value
        .map(Scalar::into_string)
        .filter(|v| !v.trim().is_empty())
}

fn scalars(values: Option<Vec<Scalar>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(Scalar::into_string)
        .collect()
}

/// Convert test entries in declared order, rejecting blank and duplicate names.
fn convert_tests<R: RawTest, T>(
    raw: Option<Vec<R>>,
    build: fn(String, String) -> T,
) -> Result<Vec<T>, ConfigError> {
    let raw = raw.unwrap_or_default();
    let mut seen = HashSet::with_capacity(raw.len());
    let mut tests = Vec::with_capacity(raw.len());

    for (i, entry) in raw.into_iter().enumerate() {
        let (name, value) = entry.into_parts();

        let name = required(name, format!("tests[{i}].name"))?;
        if !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateTestName { name });
        }
        let value = required(value, format!("tests[{i}].{}", R::KEY))?;

        tests.push(build(name, value));
    }

    Ok(tests)
}
