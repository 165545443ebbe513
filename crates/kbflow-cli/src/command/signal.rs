//! Interrupt handling for in-flight runs.

use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_SHUTDOWN;

/// Cancels `token` on SIGINT (Ctrl+C) or SIGTERM.
///
/// If a handler cannot be installed the error is logged and that signal is
/// ignored. The returned task should be aborted once the run completes.
pub fn cancel_on_signal(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        token.cancel();
    })
}

async fn wait_for_signal() {
    let interrupt = async {
        match ctrl_c().await {
            Ok(()) => {
                tracing::info!(
                    target: TRACING_TARGET_SHUTDOWN,
                    "Received Ctrl+C signal, cancelling run"
                );
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %e,
                    "Failed to install Ctrl+C handler"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match unix::signal(unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
                tracing::info!(
                    target: TRACING_TARGET_SHUTDOWN,
                    "Received SIGTERM signal, cancelling run"
                );
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_SHUTDOWN,
                    error = %e,
                    "Failed to install SIGTERM handler"
                );
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
