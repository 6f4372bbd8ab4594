//! Shared application state injected into every Axum handler.

use crate::vault::Vault;

/// Application state shared across all request handlers.
///
/// [`Vault`] is `Arc`-backed, so Axum can clone the state for each request
/// without copying the store or mail handles.
#[derive(Clone)]
pub struct AppState {
    /// Register / unlock / relay operations over the injected store and mailer.
    pub vault: Vault,
}

impl AppState {
    /// Create a new [`AppState`] around `vault`.
    pub fn new(vault: Vault) -> Self {
        Self { vault }
    }
}
