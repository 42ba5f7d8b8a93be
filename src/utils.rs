use std::time::Duration;
use tokio::sync::Notify;

/// Waits for a delay or shutdown signal. Returns true if shutdown was requested.
pub async fn check_shutdown_or_delay(shutdown: &Notify, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = shutdown.notified() => true,
    }
}
