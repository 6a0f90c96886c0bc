use dance_core::prelude::ExpectedOutcomes;

/// How error messages are compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MessageRule {
    /// The backend under test must return the same message as the reference backend.
    #[default]
    Live,
    /// The backend under test must return exactly this message. The reference message is not
    /// inspected, only its code and name.
    Literal(String),
}

/// The tolerance policy for one test case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Policy {
    message: MessageRule,
    ignore_fields: Vec<String>,
    expected: Option<ExpectedOutcomes>,
}

impl Policy {
    /// Exact comparison with live reference messages.
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn with_literal_message(mut self, message: impl Into<String>) -> Self {
        self.message = MessageRule::Literal(message.into());
        self
    }

    /// Exclude a dotted field path, e.g. `meta.took_ms`, from document comparison.
    pub fn ignoring(mut self, field: impl Into<String>) -> Self {
        self.ignore_fields.push(field.into());
        self
    }

    /// Check each backend against a documented outcome instead of against each other.
    pub fn expecting(mut self, expected: ExpectedOutcomes) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn message(&self) -> &MessageRule {
        &self.message
    }

    pub fn ignore_fields(&self) -> &[String] {
        &self.ignore_fields
    }

    pub fn expected(&self) -> Option<&ExpectedOutcomes> {
        self.expected.as_ref()
    }

    pub(crate) fn is_ignored(&self, path: &str) -> bool {
        self.ignore_fields.iter().any(|f| f == path)
    }
}
