//! Axum HTTP(S) server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Translate vault errors into JSON error bodies and status codes.
//! - Optionally terminate TLS (rustls) in-process.
//! - Stop accepting connections on SIGINT / SIGTERM.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod shutdown;
pub mod state;
pub mod tls;
