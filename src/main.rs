//! flightcache - an in-memory caching layer for an unreliable upstream
//!
//! Serves one named cache group over HTTP with coalesced upstream loads,
//! LRU eviction, staleness refresh and snapshot persistence.

mod api;
mod cache;
mod config;
mod error;
mod loader;
mod models;
mod tasks;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use cache::{Group, GroupRegistry, GroupSettings};
use config::Config;
use loader::HttpLoader;
use tasks::{spawn_refresh_task, spawn_remote_fill_task, spawn_snapshot_task, PeerClient};

/// Main entry point for the flightcache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the upstream loader and the cache group
/// 4. Restore the snapshot from disk (cold start if absent)
/// 5. Start the staleness scan, snapshot and remote-fill tasks
/// 6. Create Axum router with all endpoints
/// 7. Start HTTP server on configured port
/// 8. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flightcache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting flightcache server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: group={}, cache_bytes={}, port={}, stale_minutes={}, expire_minutes={}",
        config.group_name,
        config.cache_bytes,
        config.server_port,
        config.stale_minutes,
        config.expire_minutes
    );

    // Build the upstream loader
    let loader = match HttpLoader::new(Duration::from_secs(config.loader_timeout)) {
        Ok(loader) => Arc::new(loader),
        Err(err) => {
            eprintln!("failed to build upstream client: {err}");
            std::process::exit(1);
        }
    };

    // Create and register the cache group
    let registry = Arc::new(GroupRegistry::new());
    let group = registry.register(Group::new(
        &config.group_name,
        loader.clone(),
        GroupSettings {
            max_bytes: config.cache_bytes,
            miss_capacity: config.miss_capacity,
            expire_minutes: config.expire_minutes,
            ..GroupSettings::default()
        },
    ));

    // Restore the snapshot; absence is a cold start, failure is non-fatal
    match group.load_snapshot(&config.snapshot_path) {
        Ok(0) => info!("no snapshot found, starting cold"),
        Ok(entries) => info!(entries, "snapshot restored"),
        Err(err) => warn!(error = %err, "snapshot restore failed, starting cold"),
    }

    // Start background tasks
    let mut task_handles: Vec<JoinHandle<()>> = vec![
        spawn_refresh_task(
            group.clone(),
            config.refresh_interval,
            config.refresh_batch,
            config.stale_minutes,
        ),
        spawn_snapshot_task(
            group.clone(),
            config.snapshot_interval,
            config.snapshot_path.clone(),
        ),
    ];

    // The remote fill loop only runs when a peer is configured
    if let Some(base_url) = &config.peer_base_url {
        match PeerClient::new(
            base_url,
            &config.group_name,
            Duration::from_secs(config.loader_timeout),
        ) {
            Ok(peer) => {
                task_handles.push(spawn_remote_fill_task(
                    loader,
                    peer,
                    config.remote_fill_backoff,
                ));
                info!(peer = %base_url, "remote fill task started");
            }
            Err(err) => warn!(error = %err, "peer client setup failed, remote fill disabled"),
        }
    }
    info!("Background tasks started");

    // Create router with all endpoints
    let app = create_router(AppState::new(registry));

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(task_handles))
        .await
    {
        eprintln!("server error: {err}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the background tasks and allows graceful shutdown.
async fn shutdown_signal(task_handles: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the background tasks
    for handle in task_handles {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
