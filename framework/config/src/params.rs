use std::fmt;

use crate::kind::RunnerKind;

/// Validated runner parameters, one variant per [RunnerKind].
///
/// Values are only produced by the loader or the `new` constructors and cannot be changed
/// afterwards. Consumers are expected to `match` on the variant so that adding a runner kind fails
/// to compile until every consumer handles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerParams {
    Command(CommandParams),
    NativeTest(GoTestParams),
    ScriptedTest(JsTestParams),
    Workload(YcsbParams),
}

/// What to execute for one step of a suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// A line handed to `sh -c`.
    Shell(String),
    /// A program, looked up on `PATH` if it is not a path, with its arguments.
    Program { program: String, args: Vec<String> },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Shell(line) => f.write_str(line),
            Instruction::Program { program, args } => {
                f.write_str(program)?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
        }
    }
}

/// A named test case, in the same shape for every runner kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub instruction: Instruction,
}

impl RunnerParams {
    pub fn kind(&self) -> RunnerKind {
        match self {
            RunnerParams::Command(_) => RunnerKind::Command,
            RunnerParams::NativeTest(_) => RunnerKind::NativeTest,
            RunnerParams::ScriptedTest(_) => RunnerKind::ScriptedTest,
            RunnerParams::Workload(_) => RunnerKind::Workload,
        }
    }

    /// The working directory every instruction of the suite runs in.
    pub fn dir(&self) -> &str {
        match self {
            RunnerParams::Command(p) => &p.dir,
            RunnerParams::NativeTest(p) => &p.dir,
            RunnerParams::ScriptedTest(p) => &p.dir,
            RunnerParams::Workload(p) => &p.dir,
        }
    }

    /// The setup instruction, run once before any test case.
    pub fn setup(&self) -> Option<Instruction> {
        let setup = match self {
            RunnerParams::Command(p) => p.setup.as_ref(),
            RunnerParams::NativeTest(p) => p.setup.as_ref(),
            RunnerParams::ScriptedTest(p) => p.setup.as_ref(),
            RunnerParams::Workload(p) => p.setup.as_ref(),
        };

        setup.map(|line| Instruction::Shell(line.clone()))
    }

    /// Test cases in declared order.
    pub fn test_cases(&self) -> Vec<TestCase> {
        match self {
            RunnerParams::Command(p) => p
                .tests
                .iter()
                .map(|t| TestCase {
                    name: t.name.clone(),
                    instruction: Instruction::Shell(t.cmd.clone()),
                })
                .collect(),
            RunnerParams::NativeTest(p) => p
                .tests
                .iter()
                .map(|t| {
                    let mut args = vec![
                        "test".to_string(),
                        "-count=1".to_string(),
                        "-run".to_string(),
                        t.run.clone(),
                    ];
                    args.extend(p.args.iter().cloned());
                    TestCase {
                        name: t.name.clone(),
                        instruction: Instruction::Program {
                            program: "go".to_string(),
                            args,
                        },
                    }
                })
                .collect(),
            RunnerParams::ScriptedTest(p) => p
                .tests
                .iter()
                .map(|t| {
                    let mut args = p.args.clone();
                    args.push(t.file.clone());
                    TestCase {
                        name: t.name.clone(),
                        instruction: Instruction::Program {
                            program: p.shell.clone(),
                            args,
                        },
                    }
                })
                .collect(),
            RunnerParams::Workload(p) => p
                .tests
                .iter()
                .map(|t| TestCase {
                    name: t.name.clone(),
                    instruction: Instruction::Program {
                        program: p.bin.clone(),
                        args: vec![
                            "run".to_string(),
                            p.database.clone(),
                            "-P".to_string(),
                            t.workload.clone(),
                        ],
                    },
                })
                .collect(),
        }
    }

    /// Test names in declared order.
    pub fn test_names(&self) -> Vec<&str> {
        match self {
            RunnerParams::Command(p) => p.tests.iter().map(|t| t.name.as_str()).collect(),
            RunnerParams::NativeTest(p) => p.tests.iter().map(|t| t.name.as_str()).collect(),
            RunnerParams::ScriptedTest(p) => p.tests.iter().map(|t| t.name.as_str()).collect(),
            RunnerParams::Workload(p) => p.tests.iter().map(|t| t.name.as_str()).collect(),
        }
    }
}

/// `command` runner parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParams {
    dir: String,
    setup: Option<String>,
    tests: Vec<CommandTest>,
}

/// A single test in `command` runner parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTest {
    name: String,
    cmd: String,
}

impl CommandParams {
    pub fn new(dir: impl Into<String>, setup: Option<String>, tests: Vec<CommandTest>) -> Self {
        Self {
            dir: dir.into(),
            setup,
            tests,
        }
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn setup(&self) -> Option<&str> {
        self.setup.as_deref()
    }

    pub fn tests(&self) -> &[CommandTest] {
        &self.tests
    }
}

impl CommandTest {
    pub fn new(name: impl Into<String>, cmd: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cmd: cmd.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}

/// `gotest` runner parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoTestParams {
    dir: String,
    setup: Option<String>,
    args: Vec<String>,
    tests: Vec<GoTest>,
}

/// A single test in `gotest` runner parameters. `run` is the `-run` pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoTest {
    name: String,
    run: String,
}

impl GoTestParams {
    pub fn new(
        dir: impl Into<String>,
        setup: Option<String>,
        args: Vec<String>,
        tests: Vec<GoTest>,
    ) -> Self {
        Self {
            dir: dir.into(),
            setup,
            args,
            tests,
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn tests(&self) -> &[GoTest] {
        &self.tests
    }
}

impl GoTest {
    pub fn new(name: impl Into<String>, run: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run: run.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self) -> &str {
        &self.run
    }
}

/// `jstest` runner parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsTestParams {
    dir: String,
    setup: Option<String>,
    shell: String,
    args: Vec<String>,
    tests: Vec<JsTest>,
}

/// A single test in `jstest` runner parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsTest {
    name: String,
    file: String,
}

impl JsTestParams {
    pub const DEFAULT_SHELL: &'static str = "mongosh";

    pub fn new(
        dir: impl Into<String>,
        setup: Option<String>,
        shell: impl Into<String>,
        args: Vec<String>,
        tests: Vec<JsTest>,
    ) -> Self {
        Self {
            dir: dir.into(),
            setup,
            shell: shell.into(),
            args,
            tests,
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn tests(&self) -> &[JsTest] {
        &self.tests
    }
}

impl JsTest {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file(&self) -> &str {
        &self.file
    }
}

/// `ycsb` runner parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YcsbParams {
    dir: String,
    setup: Option<String>,
    bin: String,
    database: String,
    tests: Vec<YcsbWorkload>,
}

/// A single workload in `ycsb` runner parameters. `workload` is the properties file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YcsbWorkload {
    name: String,
    workload: String,
}

impl YcsbParams {
    pub const DEFAULT_BIN: &'static str = "./bin/ycsb";
    pub const DEFAULT_DATABASE: &'static str = "mongodb";

    pub fn new(
        dir: impl Into<String>,
        setup: Option<String>,
        bin: impl Into<String>,
        database: impl Into<String>,
        tests: Vec<YcsbWorkload>,
    ) -> Self {
        Self {
            dir: dir.into(),
            setup,
            bin: bin.into(),
            database: database.into(),
            tests,
        }
    }

    pub fn tests(&self) -> &[YcsbWorkload] {
        &self.tests
    }
}

impl YcsbWorkload {
    pub fn new(name: impl Into<String>, workload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workload: workload.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn workload(&self) -> &str {
        &self.workload
    }
}
