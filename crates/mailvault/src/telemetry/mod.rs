//! Structured logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No credential material** (password, token, email address, or derived
//!   key) may appear in any span attribute or log field.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), and
//!   `RUST_LOG` takes precedence when set.

pub mod init;

pub use init::{init_telemetry, shutdown};
