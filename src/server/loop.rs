// Server loop module
// Accepts connections until shutdown, then drains the ones still in flight

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::accept_connection;
use crate::config::AppState;

/// Back-off after a failed `accept`, e.g. when the process is out of file descriptors
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// How often the drain phase re-checks the active connection count
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the accept loop until `shutdown` resolves.
///
/// After shutdown the listener is closed first, so no new connections are
/// queued, then open connections get `performance.shutdown_timeout` seconds
/// to finish.
pub async fn start_server_loop<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            shutdown_rx.clone(),
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to accept connection");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                }
            }

            () = &mut shutdown => break,
        }
    }

    drop(listener);
    // Receivers live in the connection tasks; none left means nothing to drain
    let _ = shutdown_tx.send(true);

    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    drain_connections(&active_connections, grace).await;
}

async fn drain_connections(active_connections: &AtomicUsize, grace: Duration) {
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let remaining = active_connections.load(Ordering::SeqCst);
        if remaining == 0 {
            tracing::info!("all connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(
                remaining,
                grace_secs = grace.as_secs(),
                "shutdown grace period elapsed with connections still open"
            );
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_returns_when_idle() {
        let active = AtomicUsize::new(0);
        tokio::time::timeout(Duration::from_secs(1), drain_connections(&active, Duration::from_secs(30)))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_grace() {
        let active = AtomicUsize::new(3);
        drain_connections(&active, Duration::from_secs(2)).await;
        assert_eq!(active.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_waits_for_last_connection() {
        let active = Arc::new(AtomicUsize::new(1));
        let closer = Arc::clone(&active);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            closer.fetch_sub(1, Ordering::SeqCst);
        });

        let started = tokio::time::Instant::now();
        drain_connections(&active, Duration::from_secs(10)).await;
        assert_eq!(active.load(Ordering::SeqCst), 0);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
