//! Signal handling for graceful shutdown.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Install handlers for SIGINT (Ctrl+C) and, on Unix, SIGTERM.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal
/// arrives. The listeners stop accepting new connections once it fires.
///
/// # Errors
///
/// Returns an error if the SIGTERM handler cannot be registered.
pub fn install_signal_handler() -> Result<CancellationToken> {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    #[cfg(unix)]
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => info!("received SIGINT, shutting down"),
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down");
        }

        token_clone.cancel();
    });

    Ok(token)
}
