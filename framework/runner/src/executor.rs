use std::future::Future;

use dance_core::prelude::{ShutdownHandle, ShutdownSignalError};

/// Owns the async runtime that suites are executed on.
#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
    shutdown_handle: ShutdownHandle,
}

impl Executor {
    pub(crate) fn new(runtime: tokio::runtime::Runtime, shutdown_handle: ShutdownHandle) -> Self {
        Self {
            runtime,
            shutdown_handle,
        }
    }

    /// Run async code in place, blocking until it completes.
    ///
    /// The future is not cancelled on shutdown. It is expected to watch the [ShutdownHandle] itself
    /// so that work already in flight can finish and be recorded.
    pub fn execute_in_place<T>(&self, fut: impl Future<Output = T>) -> T {
        self.runtime.block_on(fut)
    }

    /// Fail with [ShutdownSignalError] if a shutdown was requested while running.
    pub fn check_shutdown(&self) -> anyhow::Result<()> {
        if self.shutdown_handle.is_shutdown() {
            return Err(anyhow::anyhow!(ShutdownSignalError::default()));
        }

        Ok(())
    }
}
