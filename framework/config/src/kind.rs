use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// Declares [RunnerKind] together with its lexical keys and [RunnerKind::ALL], so that a new kind
/// is listed everywhere it needs to be.
macro_rules! runner_kinds {
    ($($(#[$meta:meta])* $variant:ident => $key:literal,)+) => {
        /// The type of test runner used by a project, as named by the `runner` key.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum RunnerKind {
            $(
                $(#[$meta])*
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl RunnerKind {
            pub const ALL: &'static [RunnerKind] = &[$(RunnerKind::$variant),+];

            /// The lexical key used in project documents.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(RunnerKind::$variant => $key,)+
                }
            }
        }
    };
}

runner_kinds! {
    /// Arbitrary shell commands, one per test.
    Command => "command",
    /// Go tests selected with `-run`.
    NativeTest => "gotest",
    /// JavaScript test files run with the database shell.
    ScriptedTest => "jstest",
    /// YCSB workloads.
    Workload => "ycsb",
}

impl FromStr for RunnerKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunnerKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRunnerType {
                runner: s.to_string(),
            })
    }
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
