/// Recommended error type for code that drives a run, such as a custom `main`. Library errors with
/// a fixed shape, like [dance_config::prelude::ConfigError], are converted into this at the
/// boundary so that `?` can be used throughout.
pub type DanceResult<T> = anyhow::Result<T>;
