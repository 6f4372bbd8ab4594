//! Configuration loading and validation for the mailvault service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Credential store address (`redis://`, `rediss://`, or `memory://`). **Required.**
    pub redis_url: String,

    /// Port the HTTP(S) server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// SMTP relay host used for every outbound message.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP submission port (STARTTLS).
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Upper bound (seconds) on any single outbound send.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u64,

    /// Usage-guide link embedded in the registration notification.
    #[serde(default = "default_guide_url")]
    pub guide_url: String,

    /// PEM certificate chain. When set together with `tls_key_path`, the
    /// server speaks HTTPS.
    #[serde(default)]
    pub tls_cert_path: Option<String>,

    /// PEM private key matching `tls_cert_path`.
    #[serde(default)]
    pub tls_key_path: Option<String>,

    /// OTLP/gRPC endpoint for span export. Export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_listen_port() -> u16 {
    8080
}
fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_send_timeout() -> u64 {
    30
}
fn default_guide_url() -> String {
    "https://www.mailapi.com/guia-de-uso".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Bound applied to every outbound send.
    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    /// Certificate and key paths, if HTTPS is configured.
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (non_blank(&self.tls_cert_path), non_blank(&self.tls_key_path)) {
            (Some(cert), Some(key)) => Some((cert, key)),
            _ => None,
        }
    }

    /// OTLP endpoint, if span export is configured.
    pub fn otlp_endpoint(&self) -> Option<&str> {
        non_blank(&self.otel_exporter_otlp_endpoint)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.redis_url, "REDIS_URL")?;
        ensure_non_empty(&self.smtp_host, "SMTP_HOST")?;

        let scheme_ok = ["redis://", "rediss://", "memory://"]
            .iter()
            .any(|s| self.redis_url.starts_with(s));
        if !scheme_ok {
            anyhow::bail!("REDIS_URL must start with redis://, rediss://, or memory://");
        }
        if self.send_timeout_secs == 0 {
            anyhow::bail!("SEND_TIMEOUT_SECS must be > 0");
        }
        if non_blank(&self.tls_cert_path).is_some() != non_blank(&self.tls_key_path).is_some() {
            anyhow::bail!("TLS_CERT_PATH and TLS_KEY_PATH must be set together");
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
