//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or could not be read.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The Warpcast client could not be constructed.
    #[error(transparent)]
    Client(#[from] warpcast::Error),

    /// An error occurred while registering tools or serving MCP.
    #[error(transparent)]
    Mcp(#[from] mcp::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
