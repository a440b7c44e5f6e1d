//! Claude Proxy - local auth-rewriting reverse proxy
//!
//! This is the main entry point for the proxy server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use claude_proxy::{logging, routes, AppState, ProxyConfig, ServerSettings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = ServerSettings::from_env()?;
    let _log_guard = logging::init(&settings);

    let config = ProxyConfig::load(&settings.config_path)?;
    info!(path = %settings.config_path.display(), "Configuration loaded");

    // Builds the outbound client; a bad network policy stops startup here
    let state = Arc::new(AppState::new(config)?);

    let app = routes::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind((settings.host.as_str(), settings.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", settings.host, settings.port))?;
    let addr = listener.local_addr()?;

    info!(
        listen = %format!("http://{}", addr),
        target = %state.config.target,
        auth = %state.config.auth_type,
        cf_access = state.config.cf_access,
        verbose = settings.verbose,
        "Proxy started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Proxy shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating shutdown");
        }
    }
}
