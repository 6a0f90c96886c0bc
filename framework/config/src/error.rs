use serde::Serialize;

/// Errors raised while loading a project document.
///
/// Each error is fatal for the suite being loaded and for that suite only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("unknown runner type {runner:?}")]
    UnknownRunnerType { runner: String },
    #[error("missing required field {field:?}")]
    MissingField { field: String },
    #[error("duplicate test name {name:?}")]
    DuplicateTestName { name: String },
    #[error("malformed document: {reason}")]
    MalformedDocument { reason: String },
}

impl ConfigError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        ConfigError::MissingField {
            field: field.into(),
        }
    }

    pub(crate) fn malformed(reason: impl ToString) -> Self {
        ConfigError::MalformedDocument {
            reason: reason.to_string(),
        }
    }
}
