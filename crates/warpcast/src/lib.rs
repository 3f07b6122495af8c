//! Warpcast API client.
//!
//! One method per REST endpoint. Every call attaches the bearer token,
//! applies a fixed timeout and returns the parsed JSON body untouched.
//!
//! Failures are either returned as [`Error`] or, when
//! [`ClientConfig::propagate_errors`] is off, logged and replaced by a
//! `{"status": "error", "message": ...}` payload. A missing token or an
//! identifier that would not survive as a path segment is always an error
//! and is detected before any request is sent.
//!
//! # Example
//!
//! ```no_run
//! use warpcast::WarpcastClient;
//!
//! # async fn example() -> warpcast::Result<()> {
//! let client = WarpcastClient::builder().token("wc-token").build()?;
//! let casts = client.user_casts("dwr", 10).await?;
//! println!("{casts}");
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;

pub use client::{
    ChannelAction, WarpcastClient, WarpcastClientBuilder, auth_headers, is_error_payload,
};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_LIMIT, DEFAULT_TIMEOUT};
pub use error::{Error, Result};
