use crate::cli::DanceCli;
use clap::Parser;

/// Initialise the CLI and logging for the dance runner.
pub fn init() -> DanceCli {
    env_logger::init();

    DanceCli::parse()
}
