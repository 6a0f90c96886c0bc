mod error;
mod kind;
mod load;
mod params;
mod raw;
mod suite;

pub mod prelude {
    pub use crate::error::ConfigError;
    pub use crate::kind::RunnerKind;
    pub use crate::load::load_suite;
    pub use crate::params::{
        CommandParams, CommandTest, GoTest, GoTestParams, Instruction, JsTest, JsTestParams,
        RunnerParams, TestCase, YcsbParams, YcsbWorkload,
    };
    pub use crate::suite::{Suite, Tolerance};
}
