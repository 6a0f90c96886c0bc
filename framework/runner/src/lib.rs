mod backend;
mod cli;
mod engine;
mod executor;
mod init;
mod payload;
mod process;
mod progress;
mod projects;
mod report;
mod run;
mod shutdown;
mod types;

pub mod prelude {
    pub use crate::backend::{
        differential, Backend, BackendClient, Backends, BACKEND_ENV, BACKEND_URI_ENV,
    };
    pub use crate::cli::DanceCli;
    pub use crate::engine::{
        policy_for, CaseResult, CaseState, CaseVerdict, Engine, SuiteVerdicts, TransitionError,
        CANCELLED_BY_SHUTDOWN, DEFAULT_TIMEOUT,
    };
    pub use crate::executor::Executor;
    pub use crate::init::init;
    pub use crate::process::{ExecutionError, Invocation, Invoke, ProcessInvoker, ProcessOutput};
    pub use crate::progress::Progress;
    pub use crate::projects::{load_projects, Projects};
    pub use crate::report::{
        JsonReportCollector, ReportCollector, RunSummary, SummaryReportCollector,
    };
    pub use crate::run::run;
    pub use crate::types::DanceResult;
}
