//! HTTP surface for Shelfmate.
//!
//! Authentication happens upstream: the proxy in front of this service
//! validates the session and forwards the caller's id in the `X-User-Id`
//! header. Every handler runs its storage work on the blocking pool.
//!
//! | Method | Path                          | Result                          |
//! |--------|-------------------------------|---------------------------------|
//! | GET    | `/recommendations?category=`  | `200` list of book summaries    |
//! | POST   | `/engagements` `{ "bookId" }` | `204`                           |
//! | GET    | `/books/{id}`                 | `200` book, `404`, `400`        |
//! | GET    | `/pools/me`                   | `200` interest pool, `404`      |
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use shelfmate_core::AppConfig;
use tokio::{net::TcpListener, signal::ctrl_c};
use tracing::{error, info};

pub mod error;
pub mod routes;
pub mod state;

use routes::{book_handler, engagements_handler, pool_handler, recommendations_handler};
use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/recommendations", get(recommendations_handler))
        .route("/engagements", post(engagements_handler))
        .route("/books/{id}", get(book_handler))
        .route("/pools/me", get(pool_handler))
        .with_state(state)
}

pub async fn start_server(config: &AppConfig) -> anyhow::Result<()> {
    info!("Initializing state...");
    let state = AppState::from_config(config).context("failed to open database")?;

    let address = config.bind_address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(err) => {
                error!(%err, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(%err, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
