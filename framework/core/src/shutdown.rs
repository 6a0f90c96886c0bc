use std::sync::Arc;

use tokio::sync::watch::Sender;

/// Signals that a run should stop scheduling new work.
///
/// The signal is level triggered: once [ShutdownHandle::shutdown] has been called, every clone of
/// the handle observes it.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Arc<Sender<bool>>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: Arc::new(tokio::sync::watch::channel(false).0),
        }
    }

    pub fn shutdown(&self) {
        if !self.sender.send_replace(true) {
            log::debug!("Shutdown requested");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }
}

#[derive(derive_more::Error, derive_more::Display, Debug)]
pub struct ShutdownSignalError {
    msg: String,
}

impl Default for ShutdownSignalError {
    fn default() -> Self {
        Self {
            msg: "Execution cancelled by shutdown signal".to_string(),
        }
    }
}
