//! Server runner: starts the relay engine, binds the listener, and serves
//! until a shutdown signal arrives.

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info};

use relay_core::config::AppConfig;
use relay_core::error::{AppError, ErrorKind};
use relay_realtime::server::RelayEngine;

use crate::router::build_router;
use crate::state::AppState;

/// Runs the relay with the given configuration.
///
/// The engine is created here, once, and handed to the router; nothing is
/// global.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting relay v{}", env!("CARGO_PKG_VERSION"));

    let relay = RelayEngine::start(&config.pool);
    let addr = config.server.bind_addr();
    let app = build_router(AppState::new(config, relay));

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Network, format!("Failed to bind {addr}"), e)
    })?;

    info!("Relay listening on {}", addr);
    serve(listener, app).await?;

    info!("Relay shut down");
    Ok(())
}

/// Serves `app` on an already bound listener until Ctrl+C or SIGTERM.
///
/// Stops accepting new connections on shutdown; established WebSocket
/// clients are not signalled.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), AppError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received, no longer accepting connections");
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Network, "Server error", e))
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
                error!(error = %e, "Failed to install SIGTERM handler");
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
