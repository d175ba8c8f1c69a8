//! WhatsApp Gateway - bearer-protected messaging and webhook service.
//!
//! Loads configuration from the environment, then serves the auth,
//! messaging and webhook routes until SIGINT/SIGTERM.

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wagateway::{router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("gateway_starting");

    // Load configuration; any missing variable aborts startup
    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        meta_access_token_set = !config.meta_access_token.is_empty(),
        phone_number_id = %config.phone_number_id,
        whatsapp_api_url = %config.whatsapp_api_url,
        algorithm = ?config.algorithm,
        access_token_expire_minutes = config.access_token_expire_minutes,
        host = %config.host,
        port = config.port,
        "config_loaded"
    );

    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .context("Failed to bind to address")?;
    let addr = listener.local_addr().context("Failed to read bound address")?;

    let app = router(AppState::new(config));

    info!(address = %addr, "gateway_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("gateway_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
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
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("gateway_shutting_down");
}
