use thiserror::Error;

/// Warpcast client errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No bearer token configured; raised before any request is sent.
    #[error("WARPCAST_API_TOKEN is not set")]
    Unauthenticated,

    /// An identifier that cannot stand as its own path segment (empty,
    /// `.` or `..`); raised before any request is sent.
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),

    /// The API answered with a non-success status.
    #[error("request failed with status {status}: {body}")]
    RequestFailed { status: u16, body: String },

    /// No response was obtained (connect, DNS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The API answered 2xx with a body that is not JSON.
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
