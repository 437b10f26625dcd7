use tracing::{info, warn};

/// Resolves once the process is asked to stop with Ctrl-C. If the signal can't be listened for
/// this never resolves, leaving stdin as the only way to stop.
pub async fn detect_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C"),
        Err(e) => {
            warn!("Can't listen for Ctrl-C {e:?}");
            std::future::pending::<()>().await
        }
    }
}
