//! HTTP server bootstrap with bounded graceful shutdown and request deadlines.

use anyhow::Result;
use axum::http::StatusCode;
use axum::Router;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::timeout::TimeoutLayer;

/// Default time given to in-flight requests once shutdown starts.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Bounds each request to `timeout`; a request still running after it is
/// answered `408 Request Timeout`.
#[must_use]
pub fn request_timeout(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Serves `router` on `listener` until `shutdown` resolves.
///
/// Once `shutdown` resolves the listener stops accepting connections and
/// in-flight requests get up to `grace` to finish. The server task is aborted
/// when the grace period runs out.
///
/// # Errors
///
/// Returns an error if the server fails while accepting or serving
/// connections.
pub async fn serve<F>(listener: TcpListener, router: Router, grace: Duration, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (drain_tx, drain_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = drain_rx.await;
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            joined??;
            return Ok(());
        }
        () = shutdown => {}
    }

    let _ = drain_tx.send(());

    if let Ok(joined) = tokio::time::timeout(grace, &mut server).await {
        joined??;
    } else {
        tracing::warn!(
            grace_secs = grace.as_secs(),
            "Shutdown grace period elapsed, aborting in-flight requests"
        );
        server.abort();
    }

    Ok(())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
