//! Scanward - HTTP API server entry point

use std::net::SocketAddr;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tokio_util::sync::CancellationToken;

use scanward::{AppHandle, Config, create_app, init_tracing};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        // Only warn if it's not a "file not found" error
        if !e.not_found() {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    let config = Config::load().map_err(|e| {
        std::io::Error::other(format!(
            "Failed to load configuration. Check config/*.toml and SCANWARD__* env vars: {}",
            e
        ))
    })?;

    // Initialize tracing (after config is loaded so we can use logging config)
    init_tracing(&config.logging)?;

    tracing::info!("Starting scanward server...");
    tracing::info!(
        "Configuration loaded: server={}:{}, store={:?}",
        config.server.host,
        config.server.port,
        config.store.backend
    );

    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let enable_docs = config.server.enable_docs;
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_seconds);

    let app_handle = create_app(config).await.map_err(|e| {
        std::io::Error::other(format!("Failed to create application: {}", e))
    })?;

    let addr = SocketAddr::new(server_host.parse()?, server_port);

    tracing::info!("Server listening on {}", addr);
    if enable_docs {
        tracing::info!("OpenAPI document available at http://{}/api-docs/openapi.json", addr);
    }

    let AppHandle {
        router,
        shutdown_token,
        worker_pool,
    } = app_handle;

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    // Stop taking queued scans; running scans get the grace period to finish
    tracing::info!("Stopping scan workers...");
    shutdown_token.cancel();
    match tokio::time::timeout(shutdown_timeout, worker_pool).await {
        Ok(Ok(())) => tracing::info!("Scan workers stopped"),
        Ok(Err(e)) => tracing::error!("Scan worker pool task failed: {}", e),
        Err(_) => tracing::warn!(
            "Scan worker shutdown timeout reached after {}s; abandoning running scans",
            shutdown_timeout.as_secs()
        ),
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then stop the scan workers
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }

    // Stop intake as soon as the signal arrives, while HTTP connections drain
    shutdown_token.cancel();
}
