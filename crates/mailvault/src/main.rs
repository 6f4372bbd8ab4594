//! `mailvault`: service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (JSON logs, optional OTLP).
//! 3. Connect the credential store (fatal on failure).
//! 4. Build the SMTP mailer and the [`Vault`].
//! 5. Build the Axum router and serve HTTP or HTTPS until SIGINT / SIGTERM.

mod config;
mod crypto;
mod mail;
mod server;
mod store;
mod telemetry;
mod vault;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use config::Config;
use mail::SmtpMailer;
use server::state::AppState;
use vault::Vault;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otlp_endpoint(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        tls = cfg.tls_paths().is_some(),
        "mailvault starting"
    );

    // Store (rediss://), SMTP, and the HTTPS listener all use rustls.
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("a rustls crypto provider was already installed");
    }

    // -----------------------------------------------------------------------
    // 3. Credential store
    // -----------------------------------------------------------------------
    let store = store::connect(&cfg.redis_url)
        .await
        .context("failed to connect to credential store")?;

    // -----------------------------------------------------------------------
    // 4. Mailer + vault
    // -----------------------------------------------------------------------
    let mailer = SmtpMailer::new(cfg.smtp_host.clone(), cfg.smtp_port, cfg.send_timeout());
    let vault = Vault::new(
        store,
        Arc::new(mailer),
        cfg.send_timeout(),
        cfg.guide_url.as_str(),
    );

    // -----------------------------------------------------------------------
    // 5. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(AppState::new(vault));
    let shutdown = server::shutdown::install_signal_handler()?;

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    match cfg.tls_paths() {
        Some((cert_path, key_path)) => {
            let tls = server::tls::load_server_config(cert_path, key_path)?;
            server::tls::serve(listener, router, tls, shutdown).await?;
        }
        None => {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await?;
        }
    }

    info!("mailvault stopped");
    telemetry::shutdown();
    Ok(())
}
