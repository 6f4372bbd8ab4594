//! OTEL SDK initialisation: tracing subscriber + optional OTLP exporter.

use anyhow::{Context, Result};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialise the global tracing subscriber and, if `otlp_endpoint` is set,
/// the OTLP span pipeline.
///
/// Configures:
/// - A JSON-formatted [`tracing_subscriber`] layer for structured log output.
/// - A [`tracing_opentelemetry`] layer that exports spans to the OTLP endpoint.
///
/// # Errors
///
/// Returns an error if the OTLP exporter cannot be initialised or a global
/// subscriber is already installed.
pub fn init_telemetry(otlp_endpoint: Option<&str>, log_level: &str) -> Result<()> {
    let otel_layer = match otlp_endpoint {
        Some(endpoint) => Some(tracing_opentelemetry::layer().with_tracer(build_tracer(endpoint)?)),
        None => None,
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().json())
        .with(otel_layer)
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    Ok(())
}

/// Flush and stop span export. A no-op when OTLP was never configured.
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}

fn build_tracer(endpoint: &str) -> Result<opentelemetry_sdk::trace::Tracer> {
    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default().with_resource(service_resource()),
        )
        .install_batch(runtime::Tokio)
        .context("failed to install OTLP tracing pipeline")
}

fn service_resource() -> Resource {
    Resource::new(vec![
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_NAME,
            "mailvault",
        ),
        KeyValue::new(
            opentelemetry_semantic_conventions::resource::SERVICE_VERSION,
            env!("CARGO_PKG_VERSION"),
        ),
    ])
}
