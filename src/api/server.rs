//! HTTP server lifecycle: bind, spawn, graceful shutdown.
//!
//! Binds to loopback only. The app holds medication data for a single
//! person on their own machine, so it is never exposed to the network.
//!
//! Pattern: bind → spawn background task → return handle with a
//! shutdown channel.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::api::router::app_router;
use crate::core_state::CoreState;

/// Handle to a running app server.
pub struct AppServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl AppServer {
    /// Browser-facing base URL.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shut down the server gracefully. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Server shutdown signal sent");
        }
    }
}

/// Start the app server on loopback.
///
/// `port` 0 asks the OS for an ephemeral port; the chosen address is
/// available on the returned handle. The axum server runs in a
/// background tokio task until `shutdown` is called.
pub async fn start_server(core: Arc<CoreState>, port: u16) -> Result<AppServer, String> {
    let listener = tokio::net::TcpListener::bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), port))
        .await
        .map_err(|e| format!("Failed to bind server on port {port}: {e}"))?;

    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get server address: {e}"))?;

    let app = app_router(core);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Server received shutdown signal");
        };

        tracing::info!(%addr, "Server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Server error: {e}");
        }

        tracing::info!("Server stopped");
    });

    Ok(AppServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}
