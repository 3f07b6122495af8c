//! Client configuration.

use std::time::Duration;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.warpcast.com/v2";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Page size used when a caller does not pass `limit`.
pub const DEFAULT_LIMIT: u32 = 20;

/// Settings passed to [`WarpcastClient::new`](crate::WarpcastClient::new).
///
/// Fixed for the lifetime of the client.
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Bearer token. `None` is allowed; every call then fails with
    /// [`Error::Unauthenticated`](crate::Error::Unauthenticated).
    pub token: Option<String>,
    pub timeout: Duration,
    /// Return failures as `Err` instead of the `{"status": "error"}` payload.
    pub propagate_errors: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            propagate_errors: false,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("propagate_errors", &self.propagate_errors)
            .finish()
    }
}
