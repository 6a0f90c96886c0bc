use dance_core::prelude::ShutdownHandle;
use tokio::signal;

/// Listen for Ctrl-C on `runtime`.
///
/// The first signal stops new test cases from starting and lets running ones finish. A second
/// signal exits immediately.
pub(crate) fn start_shutdown_listener(
    runtime: &tokio::runtime::Runtime,
) -> anyhow::Result<ShutdownHandle> {
    let handle = ShutdownHandle::default();

    let listener_handle = handle.clone();
    runtime.spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e:?}");
            return;
        }
        listener_handle.shutdown();
        println!("Received shutdown signal, waiting for running test cases to finish...");

        if signal::ctrl_c().await.is_ok() {
            println!("Received second shutdown signal, exiting");
            std::process::exit(130);
        }
    });

    Ok(handle)
}
