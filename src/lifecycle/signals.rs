//! OS signal handling.
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGINT and SIGTERM both mean graceful shutdown
//! - Signals are turned into a `Shutdown::trigger`, the server only ever
//!   waits on the broadcast

use tokio::sync::broadcast;

/// Resolves when Ctrl+C or SIGTERM arrives.
pub async fn os_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+C received"),
        _ = terminate => tracing::info!("SIGTERM received"),
    }
}

/// Resolves when the shutdown broadcast fires.
///
/// A closed channel never resolves: a dropped coordinator can no longer
/// trigger, so it must not end serving.
pub async fn shutdown_signal(mut internal: broadcast::Receiver<()>) {
    if internal.recv().await.is_err() {
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown triggered");
}
