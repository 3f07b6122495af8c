//! Warpcast tools exposed over MCP.
//!
//! Each tool validates its input, calls exactly one [`WarpcastClient`]
//! operation and turns every failure into an `Error (<Kind>): ...` string.
//! Nothing in this crate returns a raw client error to the caller.
//!
//! | Tool | Client operation |
//! |---|---|
//! | `post_cast` | `POST /casts` |
//! | `get_user_casts` | `GET /users/{username}/casts` |
//! | `search_casts` | `GET /casts/search` |
//! | `get_trending_casts` | `GET /casts/trending` |
//! | `get_all_channels` | `GET /channels` |
//! | `get_channel` | `GET /channels/{id}` |
//! | `get_channel_casts` | `GET /channels/{id}/casts` |
//! | `follow_channel` | `POST /channels/{id}/follow` |
//! | `unfollow_channel` | `POST /channels/{id}/unfollow` |

pub mod cast;
pub mod channel;
mod format;
mod validate;

use std::sync::Arc;

use mcp::ToolRegistry;
use warpcast::WarpcastClient;

pub use format::{API_ERROR, CONFIGURATION, INPUT_VALIDATION, format_error};
pub use validate::{MAX_CAST_LENGTH, validate_cast_text};

/// Register every Warpcast tool against `client`.
pub fn register_all(registry: &mut ToolRegistry, client: Arc<WarpcastClient>) -> mcp::Result<()> {
    cast::register(registry, &client)?;
    channel::register(registry, &client)?;
    Ok(())
}

/// A registry holding every Warpcast tool.
pub fn registry(client: Arc<WarpcastClient>) -> mcp::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    register_all(&mut registry, client)?;
    Ok(registry)
}
