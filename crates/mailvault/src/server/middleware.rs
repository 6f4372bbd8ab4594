//! Settings for the middleware layers attached in [`super::router`].

use std::time::Duration;

/// Default per-request timeout applied to all routes. Must stay above the
/// outbound send timeout so a slow relay reports its own error first.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
