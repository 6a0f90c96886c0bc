mod document;
mod outcome;
mod shutdown;

pub mod prelude {
    pub use crate::document::{double_eq, Document, Value};
    pub use crate::outcome::{CaseOutcome, CommandError, Expectation, ExpectedOutcomes, Failure};
    pub use crate::shutdown::{ShutdownHandle, ShutdownSignalError};
}
