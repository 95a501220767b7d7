//! Form Relay server.
//!
//! Loads configuration from the environment, builds the SMTP relay client
//! and serves the form endpoint until SIGINT or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use formrelay::{router, AppState, Config, SmtpMailer};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("form_relay_starting");

    // Load configuration
    let config = Config::from_env()
        .inspect_err(|e| error!(error = %e, "config_load_failed"))
        .context("Failed to load configuration")?;
    info!(
        smtp_host = %config.smtp_host,
        smtp_port = config.smtp_port,
        smtp_tls = ?config.smtp_tls,
        recipient = %config.recipient_email,
        server_port = config.server_port,
        max_body_bytes = config.max_body_bytes,
        request_timeout_secs = config.request_timeout.as_secs(),
        "config_loaded"
    );

    let mailer = SmtpMailer::from_config(&config)
        .inspect_err(|e| error!(error = %e, "smtp_mailer_init_failed"))
        .context("Failed to configure SMTP relay")?;

    let port = config.server_port;
    let app = router(AppState::new(config, Arc::new(mailer)));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .inspect_err(|e| error!(error = %e, address = %addr, "bind_failed"))
        .context("Failed to bind to address")?;

    info!(address = %addr, "form_relay_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("form_relay_shutdown_complete");

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

    info!("form_relay_shutting_down");
}
