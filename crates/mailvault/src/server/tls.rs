//! In-process TLS termination using rustls.
//!
//! Enabled when both `TLS_CERT_PATH` and `TLS_KEY_PATH` are configured;
//! otherwise the service speaks plain HTTP and expects a terminating proxy in
//! front of it. Bearer tokens are equivalent to passwords, so plain HTTP must
//! never be exposed directly.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use hyper::{body::Incoming, Request};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use rustls::ServerConfig;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_util::sync::CancellationToken;
use tower::Service;
use tracing::{debug, error, info};

/// Build a [`rustls::ServerConfig`] from PEM-encoded certificate and private key bytes.
///
/// ALPN advertises `h2` and `http/1.1`.
///
/// # Errors
///
/// Returns an error if the certificate or key cannot be parsed, or if rustls
/// rejects the configuration.
pub fn build_server_config(cert_pem: &[u8], key_pem: &[u8]) -> Result<Arc<ServerConfig>> {
    let certs = rustls_pemfile::certs(&mut std::io::BufReader::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to parse TLS certificate chain")?;
    if certs.is_empty() {
        anyhow::bail!("no certificate found in PEM data");
    }

    let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(key_pem))
        .context("failed to read TLS private key")?
        .context("no private key found in PEM data")?;

    let mut config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .context("failed to select TLS protocol versions")?
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .context("failed to build rustls ServerConfig")?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

/// Read the PEM files at `cert_path` and `key_path` and build the server config.
///
/// # Errors
///
/// Returns an error if either file cannot be read or parsed.
pub fn load_server_config(cert_path: &str, key_path: &str) -> Result<Arc<ServerConfig>> {
    let cert_pem = std::fs::read(cert_path)
        .with_context(|| format!("failed to read TLS certificate from {cert_path}"))?;
    let key_pem = std::fs::read(key_path)
        .with_context(|| format!("failed to read TLS private key from {key_path}"))?;
    build_server_config(&cert_pem, &key_pem)
}

/// Accept loop: terminate TLS on each connection and hand it to `router`.
///
/// Stops accepting when `shutdown` is cancelled. Connections already being
/// served run to completion on their own tasks.
pub async fn serve(
    listener: TcpListener,
    router: Router,
    tls: Arc<ServerConfig>,
    shutdown: CancellationToken,
) -> Result<()> {
    let acceptor = TlsAcceptor::from(tls);

    loop {
        let (tcp_stream, peer_addr) = tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "accept error");
                    continue;
                }
            },
        };

        let acceptor = acceptor.clone();
        let router = router.clone();
        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(tcp_stream).await {
                Ok(s) => s,
                Err(e) => {
                    debug!(%peer_addr, error = %e, "TLS handshake failed");
                    return;
                }
            };

            let service = hyper::service::service_fn(move |req: Request<Incoming>| {
                router.clone().call(req)
            });
            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(tls_stream), service)
                .await
            {
                debug!(%peer_addr, error = %e, "connection error");
            }
        });
    }

    info!("TLS listener stopped accepting connections");
    Ok(())
}
