use crate::error::ConfigError;
use crate::kind::RunnerKind;
use crate::raw::{convert_params, RawProject, Scalar};
use crate::suite::Suite;

/// Load one suite from the text of its project document.
///
/// The document is first parsed into its format-shaped raw form and then validated and converted
/// into [crate::params::RunnerParams] for the declared runner. Nothing outside `text` is read; in
/// particular `dir` is not checked for existence here.
pub fn load_suite(name: &str, text: &str) -> Result<Suite, ConfigError> {
    let raw: RawProject = serde_yaml::from_str(text).map_err(ConfigError::malformed)?;

    let runner = raw
        .runner
        .map(Scalar::into_string)
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(|| ConfigError::missing("runner"))?;
    let kind: RunnerKind = runner.parse()?;

    let params = raw
        .params
        .filter(|p| !p.is_null())
        .ok_or_else(|| ConfigError::missing("params"))?;
    let params = convert_params(kind, params)?;

    let tolerance = raw.compare.unwrap_or_default().convert(&params)?;

    log::debug!(
        "Loaded suite {name} with runner {kind} and {} test(s)",
        params.test_names().len()
    );

    Ok(Suite::new(name, params, tolerance))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use dance_core::prelude::{CommandError, Document, Expectation};

    use super::*;
    use crate::params::{CommandParams, CommandTest, Instruction, RunnerParams};

    fn command_params(suite: &Suite) -> &CommandParams {
        match suite.params() {
            RunnerParams::Command(p) => p,
            other => panic!("expected command params, got {other:?}"),
        }
    }

    #[test]
    fn load_command_suite() {
        let suite = load_suite("floats", COMMAND_PROJECT).expect("valid project");

        let params = command_params(&suite);
        assert_eq!("floats", suite.name());
        assert_eq!("/tmp/x", params.dir());
        assert_eq!(Some("make setup"), params.setup());
        assert_eq!(
            vec![
                CommandTest::new("NaN", "insert-nan"),
                CommandTest::new("NegativeZero", "insert-negative-zero"),
                CommandTest::new("Infinity", "update-mul-max"),
            ],
            params.tests()
        );
    }

    #[test]
    fn declared_order_is_preserved() {
        let suite = load_suite("order", ORDERED_PROJECT).expect("valid project");

        assert_eq!(vec!["z", "a", "m"], suite.params().test_names());
    }

    #[test]
    fn empty_test_list_is_legal() {
        let suite = load_suite("empty", "runner: command\nparams:\n  dir: /tmp/x\n")
            .expect("valid project");

        let params = command_params(&suite);
        assert!(params.tests().is_empty());
        assert_eq!(None, params.setup());
    }

    #[test]
    fn blank_setup_is_no_setup() {
        let suite = load_suite(
            "blank",
            "runner: command\nparams:\n  dir: /tmp/x\n  setup: \"\"\n",
        )
        .expect("valid project");

        assert_eq!(None, suite.params().setup());
    }

    #[test]
    fn missing_dir() {
        let err = load_suite(
            "no-dir",
            "runner: command\nparams:\n  tests:\n    - name: a\n      cmd: \"true\"\n",
        )
        .unwrap_err();

        assert_eq!(
            ConfigError::MissingField {
                field: "dir".to_string()
            },
            err
        );
    }

    #[test]
    fn empty_dir_is_missing() {
        let err = load_suite("empty-dir", "runner: command\nparams:\n  dir: \"\"\n").unwrap_err();

        assert_eq!(
            ConfigError::MissingField {
                field: "dir".to_string()
            },
            err
        );
    }

    #[test]
    fn duplicate_test_name() {
        let err = load_suite("dup", DUPLICATE_PROJECT).unwrap_err();

        assert_eq!(
            ConfigError::DuplicateTestName {
                name: "x".to_string()
            },
            err
        );
    }

    #[test]
    fn missing_test_fields_are_reported_with_their_path() {
        let err = load_suite(
            "no-cmd",
            "runner: command\nparams:\n  dir: /tmp/x\n  tests:\n    - name: a\n      cmd: ok\n    - name: b\n",
        )
        .unwrap_err();
        assert_eq!(ConfigError::missing("tests[1].cmd"), err);

        let err = load_suite(
            "no-name",
            "runner: command\nparams:\n  dir: /tmp/x\n  tests:\n    - cmd: ok\n",
        )
        .unwrap_err();
        assert_eq!(ConfigError::missing("tests[0].name"), err);
    }

    #[test]
    fn unknown_runner_type() {
        let err = load_suite("pytest", "runner: pytest\nparams:\n  dir: /tmp/x\n").unwrap_err();

        assert_eq!(
            ConfigError::UnknownRunnerType {
                runner: "pytest".to_string()
            },
            err
        );
    }

    #[test]
    fn missing_runner_and_params() {
        assert_eq!(
            ConfigError::missing("runner"),
            load_suite("no-runner", "params:\n  dir: /tmp/x\n").unwrap_err()
        );
        assert_eq!(
            ConfigError::missing("params"),
            load_suite("no-params", "runner: command\n").unwrap_err()
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let suite = load_suite(
            "extra",
            "runner: command\nresults:\n  mongodb: {}\nparams:\n  dir: /tmp/x\n  color: blue\n  tests:\n    - name: a\n      cmd: ok\n      timeout: 5\n",
        )
        .expect("unknown keys should be ignored");

        assert_eq!(vec!["a"], suite.params().test_names());
    }

    #[test]
    fn malformed_documents() {
        let err = load_suite("bad-yaml", "runner: [command\n").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument { .. }), "{err:?}");

        let err = load_suite("bad-tests", "runner: command\nparams:\n  dir: /tmp/x\n  tests: 5\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument { .. }), "{err:?}");

        let err = load_suite("bad-params", "runner: command\nparams: 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument { .. }), "{err:?}");
    }

    #[test]
    fn every_runner_kind_has_a_conversion() {
        for &kind in RunnerKind::ALL {
            let text = format!("runner: {kind}\nparams:\n  dir: /tmp/x\n");
            let suite = load_suite(kind.as_str(), &text).expect("minimal project should load");

            assert_eq!(kind, suite.params().kind());
            assert_eq!("/tmp/x", suite.params().dir());
        }
    }

    #[test]
    fn load_go_test_suite() {
        let suite = load_suite("go", GO_PROJECT).expect("valid project");

        let cases = suite.params().test_cases();
        assert_eq!(2, cases.len());
        assert_eq!(
            Instruction::Program {
                program: "go".to_string(),
                args: vec![
                    "test".to_string(),
                    "-count=1".to_string(),
                    "-run".to_string(),
                    "TestInsert".to_string(),
                    "-v".to_string(),
                    "./...".to_string(),
                ],
            },
            cases[0].instruction
        );
    }

    #[test]
    fn go_test_requires_run_pattern() {
        let err = load_suite(
            "go",
            "runner: gotest\nparams:\n  dir: tests\n  tests:\n    - name: insert\n",
        )
        .unwrap_err();

        assert_eq!(ConfigError::missing("tests[0].run"), err);
    }

    #[test]
    fn load_js_and_ycsb_defaults() {
        let suite = load_suite(
            "js",
            "runner: jstest\nparams:\n  dir: jstests\n  tests:\n    - name: basic\n      file: core/basic.js\n",
        )
        .expect("valid project");
        assert_eq!(
            "mongosh core/basic.js",
            suite.params().test_cases()[0].instruction.to_string()
        );

        let suite = load_suite(
            "ycsb",
            "runner: ycsb\nparams:\n  dir: ycsb\n  bin: go-ycsb\n  tests:\n    - name: a\n      workload: workloads/workloada\n",
        )
        .expect("valid project");
        assert_eq!(
            "go-ycsb run mongodb -P workloads/workloada",
            suite.params().test_cases()[0].instruction.to_string()
        );
    }

    #[test]
    fn compare_block_is_loaded() {
        let suite = load_suite("floats", COMMAND_PROJECT).expect("valid project");

        assert_eq!(
            Some("NaN is not supported"),
            suite.tolerance().expected_message("NaN")
        );
        assert_eq!(None, suite.tolerance().expected_message("Infinity"));
        assert_eq!(vec!["meta.took_ms".to_string()], suite.tolerance().ignore_fields());
    }

    #[test]
    fn compare_messages_must_name_declared_tests() {
        let err = load_suite(
            "unknown-message",
            "runner: command\nparams:\n  dir: /tmp/x\ncompare:\n  messages:\n    ghost: boo\n",
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MalformedDocument { .. }), "{err:?}");
    }

    #[test]
    fn scalars_are_read_as_text() {
        let suite = load_suite(
            "scalars",
            "runner: command\nparams:\n  dir: .\n  tests:\n    - name: a\n      cmd: true\n    - name: 1\n      cmd: false\n",
        )
        .expect("scalar values should load as strings");

        assert_eq!(
            vec![CommandTest::new("a", "true"), CommandTest::new("1", "false")],
            command_params(&suite).tests()
        );
    }

    #[test]
    fn collections_are_not_scalars() {
        let err = load_suite(
            "list-cmd",
            "runner: command\nparams:\n  dir: .\n  tests:\n    - name: a\n      cmd: [echo, hi]\n",
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::MalformedDocument { .. }), "{err:?}");
    }

    #[test]
    fn expected_outcomes_are_loaded() {
        let suite = load_suite("floats", EXPECT_PROJECT).expect("valid project");

        let nan = suite
            .tolerance()
            .expected_outcomes("NaN")
            .expect("NaN has documented outcomes");
        assert_eq!(Expectation::Success, nan.reference);
        assert_eq!(
            Expectation::Error(CommandError::new(2, "BadValue", "NaN is not supported")),
            nan.under_test
        );

        let mul = suite
            .tolerance()
            .expected_outcomes("UpdateOneMul")
            .expect("UpdateOneMul has documented outcomes");
        let expected = Document::new().with("_id", "number1").with("v", -0.0);
        assert_eq!(Expectation::Document(expected.clone()), mul.reference);
        assert_eq!(Expectation::Document(expected), mul.under_test);

        assert_eq!(None, suite.tolerance().expected_outcomes("Other"));
    }

    #[test]
    fn expected_outcomes_are_validated() {
        let project = |expect: &str| {
            format!(
                "runner: command\nparams:\n  dir: .\n  tests:\n    - name: a\n      cmd: x\ncompare:\n  expect:\n{expect}"
            )
        };

        let err = load_suite("ghost", &project("    ghost:\n      reference: success\n      under_test: success\n"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument { .. }), "{err:?}");

        let err = load_suite("one-side", &project("    a:\n      reference: success\n")).unwrap_err();
        assert_eq!(ConfigError::missing("compare.expect.a.under_test"), err);

        let err = load_suite(
            "no-code",
            &project("    a:\n      reference: success\n      under_test:\n        error: { name: BadValue, message: nope }\n"),
        )
        .unwrap_err();
        assert_eq!(ConfigError::missing("compare.expect.a.under_test.error.code"), err);

        let err = load_suite(
            "typo",
            &project("    a:\n      reference: succes\n      under_test: success\n"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument { .. }), "{err:?}");

        let err = load_suite(
            "both",
            &project("    a:\n      reference:\n        document: {}\n        error: { code: 2, name: B, message: m }\n      under_test: success\n"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MalformedDocument { .. }), "{err:?}");
    }

    const EXPECT_PROJECT: &str = r#"
runner: command
params:
  dir: .
  tests:
    - name: "NaN"
      cmd: insert-nan
    - name: UpdateOneMul
      cmd: update-mul
    - name: Other
      cmd: other
compare:
  expect:
    "NaN":
      reference: success
      under_test:
        error:
          code: 2
          name: BadValue
          message: NaN is not supported
    UpdateOneMul:
      reference:
        document: { _id: number1, v: -0.0 }
      under_test:
        document: { _id: number1, v: -0.0 }
"#;

    const COMMAND_PROJECT: &str = r#"
# float values, compared against the reference
runner: command
params:
  dir: /tmp/x
  setup: make setup
  tests:
    - name: "NaN"
      cmd: insert-nan
    - name: NegativeZero
      cmd: insert-negative-zero
    - name: "Infinity"
      cmd: update-mul-max
compare:
  ignore_fields:
    - meta.took_ms
  messages:
    "NaN": NaN is not supported
"#;

    const ORDERED_PROJECT: &str = r#"
runner: command
params:
  dir: /tmp/x
  tests:
    - name: z
      cmd: "true"
    - name: a
      cmd: "true"
    - name: m
      cmd: "true"
"#;

    const DUPLICATE_PROJECT: &str = r#"
runner: command
params:
  dir: /tmp/x
  tests:
    - name: x
      cmd: one
    - name: x
      cmd: two
"#;

    const GO_PROJECT: &str = r#"
runner: gotest
params:
  dir: tests
  args: ["-v", "./..."]
  tests:
    - name: insert
      run: TestInsert
    - name: update
      run: TestUpdate
"#;
}
