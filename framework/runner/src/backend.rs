use std::fmt;
use std::str::FromStr;

use dance_compare::prelude::{compare, Policy, Verdict};
use dance_core::prelude::{CaseOutcome, CommandError, Document};
use futures::future::BoxFuture;
use serde::Serialize;

/// Environment variable holding the name of the backend a test case runs against.
pub const BACKEND_ENV: &str = "DANCE_BACKEND";
/// Environment variable holding the connection string of the backend a test case runs against.
pub const BACKEND_URI_ENV: &str = "DANCE_BACKEND_URI";

/// A database endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backend {
    pub name: String,
    pub uri: String,
}

impl Backend {
    pub fn new(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uri: uri.into(),
        }
    }

    /// Environment passed to every process run against this backend.
    pub fn env(&self) -> Vec<(String, String)> {
        vec![
            (BACKEND_ENV.to_string(), self.name.clone()),
            (BACKEND_URI_ENV.to_string(), self.uri.clone()),
        ]
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.uri)
    }
}

/// Parses `name=uri`.
impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, uri) = s
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Expected a backend as `name=uri`, got `{s}`"))?;

        let (name, uri) = (name.trim(), uri.trim());
        if name.is_empty() || uri.is_empty() {
            anyhow::bail!("Backend name and uri must not be empty in `{s}`");
        }

        Ok(Backend::new(name, uri))
    }
}

/// The two endpoints of a differential run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backends {
    /// The implementation whose behaviour is taken as correct.
    pub reference: Backend,
    pub under_test: Backend,
}

/// A connection to a backend that can run a single command.
///
/// This is the seam for diff tests that talk to the backends from inside the process instead of
/// through a test case command.
pub trait BackendClient: Send + Sync {
    fn run_command(&self, command: Document) -> BoxFuture<'_, Result<Document, CommandError>>;
}

/// Run `command` on both clients concurrently and compare the replies.
///
/// Both replies are always awaited; the first to finish does not decide anything.
pub async fn differential(
    reference: &dyn BackendClient,
    under_test: &dyn BackendClient,
    command: Document,
    policy: &Policy,
) -> Verdict {
    let (reference_result, under_test_result) = futures::join!(
        reference.run_command(command.clone()),
        under_test.run_command(command)
    );

    compare(
        &CaseOutcome::from(reference_result),
        &CaseOutcome::from(under_test_result),
        policy,
    )
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::FutureExt;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Replies with a fixed result after an optional delay.
    struct FakeClient {
        reply: Result<Document, CommandError>,
        delay: Duration,
    }

    impl FakeClient {
        fn replying(reply: Result<Document, CommandError>) -> Self {
            Self {
                reply,
                delay: Duration::ZERO,
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl BackendClient for FakeClient {
        fn run_command(&self, _command: Document) -> BoxFuture<'_, Result<Document, CommandError>> {
            async move {
                tokio::time::sleep(self.delay).await;
                self.reply.clone()
            }
            .boxed()
        }
    }

    fn nan_not_supported() -> CommandError {
        CommandError::new(2, "BadValue", "NaN is not supported")
    }

    fn insert_nan() -> Document {
        Document::new()
            .with("insert", "values")
            .with("documents", vec![Document::new().with("v", f64::NAN).into()])
    }

    #[tokio::test]
    async fn error_vs_success_diverges() {
        let reference = FakeClient::replying(Err(nan_not_supported()));
        let under_test = FakeClient::replying(Ok(Document::new().with("ok", 1.0)));

        let verdict = differential(&reference, &under_test, insert_nan(), &Policy::strict()).await;

        match verdict {
            Verdict::Diverge(divergence) => {
                assert_eq!(
                    CaseOutcome::from(Err::<Document, _>(nan_not_supported())),
                    divergence.reference
                );
                assert_eq!(
                    CaseOutcome::Succeeded(Document::new().with("ok", 1.0)),
                    divergence.under_test
                );
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn same_error_matches() {
        let reference = FakeClient::replying(Err(nan_not_supported()));
        let under_test = FakeClient::replying(Err(nan_not_supported()));

        let verdict = differential(&reference, &under_test, insert_nan(), &Policy::strict()).await;

        assert_eq!(Verdict::Match, verdict);
    }

    #[tokio::test]
    async fn waits_for_the_slower_backend() {
        let reference = FakeClient::replying(Err(nan_not_supported()))
            .delayed(Duration::from_millis(200));
        let under_test = FakeClient::replying(Ok(Document::new()));

        let verdict = differential(&reference, &under_test, insert_nan(), &Policy::strict()).await;

        assert!(matches!(verdict, Verdict::Diverge(_)), "{verdict:?}");
    }

    #[test]
    fn parse_backend() {
        assert_eq!(
            Backend::new("ferretdb", "mongodb://127.0.0.1:27017/"),
            "ferretdb=mongodb://127.0.0.1:27017/"
                .parse::<Backend>()
                .expect("valid backend")
        );

        assert!("ferretdb".parse::<Backend>().is_err());
        assert!("=mongodb://127.0.0.1:27017/".parse::<Backend>().is_err());
    }

    #[test]
    fn env_names_the_backend() {
        let backend = Backend::new("mongodb", "mongodb://127.0.0.1:47017/");

        assert_eq!(
            vec![
                ("DANCE_BACKEND".to_string(), "mongodb".to_string()),
                ("DANCE_BACKEND_URI".to_string(), "mongodb://127.0.0.1:47017/".to_string()),
            ],
            backend.env()
        );
    }
}
