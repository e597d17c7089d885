//! HTTP server initialization and runtime setup.
//!
//! Handles store connection, worker spawning, and Axum server lifecycle.

use crate::application::services::UrlService;
use crate::config::{Config, StoreBackend};
use crate::domain::repositories::MappingStore;
use crate::domain::visit_worker::run_visit_worker;
use crate::infrastructure::store::{MemoryStore, RedisStore};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How often the `memory` backend sweeps expired keys.
const MEMORY_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Creates the store selected by the configuration.
///
/// # Errors
///
/// Returns an error if Redis cannot be reached after the configured retries.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn MappingStore>> {
    let store: Arc<dyn MappingStore> = match config.store_backend {
        StoreBackend::Redis => Arc::new(
            RedisStore::connect(
                &config.redis_url,
                &config.redis_key_prefix,
                config.redis_connect_retries,
            )
            .await
            .context("Failed to connect to Redis")?,
        ),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; mappings are lost on restart");
            let store = Arc::new(MemoryStore::new());
            store.spawn_purge_task(MEMORY_PURGE_INTERVAL);
            store as Arc<dyn MappingStore>
        }
    };

    Ok(store)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Mapping store (Redis or in-memory)
/// - URL service
/// - Background visit worker
/// - Axum HTTP server
///
/// On Ctrl-C or SIGTERM the server stops accepting connections, finishes
/// in-flight requests, then waits for the visit worker to drain.
///
/// # Errors
///
/// Returns an error if:
/// - Store connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = connect_store(&config).await?;
    let url_service = Arc::new(UrlService::new(store, config.service_settings()));

    let (visit_tx, visit_rx) = mpsc::channel(config.visit_queue_capacity);
    let worker = tokio::spawn(run_visit_worker(
        visit_rx,
        url_service.clone(),
        config.visit_worker_settings(),
    ));

    let state = AppState::new(url_service, visit_tx, config.base_url.clone());

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    // The router owns the last visit sender; the worker sees the channel
    // close once serve returns and the router is dropped.
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, waiting for visit worker");
    if let Err(e) = worker.await {
        tracing::error!("Visit worker terminated abnormally: {}", e);
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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

    tracing::info!("Shutdown signal received");
}
