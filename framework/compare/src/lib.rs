mod compare;
mod diff;
mod policy;
mod verdict;

pub mod prelude {
    pub use crate::compare::compare;
    pub use crate::policy::{MessageRule, Policy};
    pub use crate::verdict::{Divergence, Verdict};
}
