//! Cast tools.

use std::sync::Arc;

use mcp::{ToolOutput, ToolRegistry};
use serde::Deserialize;
use serde_json::{Value, json};
use warpcast::{DEFAULT_LIMIT, WarpcastClient};

use crate::format::{INPUT_VALIDATION, checked, format_error, payload};
use crate::validate::{MAX_CAST_LENGTH, validate_cast_text};

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostCastArgs {
    pub text: String,
    #[serde(default)]
    pub parent_cast_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserCastsArgs {
    pub username: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchCastsArgs {
    pub query: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendingCastsArgs {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Post a new cast; validates length before calling out.
pub async fn post_cast(client: &WarpcastClient, args: PostCastArgs) -> ToolOutput {
    if !validate_cast_text(&args.text) {
        return ToolOutput::Failure(format_error(
            INPUT_VALIDATION,
            &format!("Cast text exceeds {MAX_CAST_LENGTH} character limit"),
            None,
        ));
    }

    let result = client
        .post_cast(&args.text, args.parent_cast_id.as_deref())
        .await;
    match checked("Error posting cast", result) {
        Ok(data) => {
            let url = data.get("url").and_then(Value::as_str).unwrap_or_default();
            ToolOutput::Text(format!("Cast posted successfully! View at: {url}"))
        }
        Err(failure) => failure,
    }
}

pub async fn get_user_casts(client: &WarpcastClient, args: UserCastsArgs) -> ToolOutput {
    payload(
        "Failed to get user casts",
        client.user_casts(&args.username, args.limit).await,
    )
}

pub async fn search_casts(client: &WarpcastClient, args: SearchCastsArgs) -> ToolOutput {
    payload(
        "Failed to search casts",
        client.search_casts(&args.query, args.limit).await,
    )
}

pub async fn get_trending_casts(client: &WarpcastClient, args: TrendingCastsArgs) -> ToolOutput {
    payload(
        "Failed to get trending casts",
        client.trending_casts(args.limit).await,
    )
}

fn limit_schema() -> Value {
    json!({
        "type": "integer",
        "minimum": 0,
        "default": DEFAULT_LIMIT,
        "description": "Maximum number of casts to return"
    })
}

pub(crate) fn register(registry: &mut ToolRegistry, client: &Arc<WarpcastClient>) -> mcp::Result<()> {
    let c = Arc::clone(client);
    registry.register_typed(
        "post_cast",
        "Post a new cast to Warpcast.",
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "maxLength": MAX_CAST_LENGTH,
                    "description": "Cast text"
                },
                "parent_cast_id": {
                    "type": "string",
                    "description": "Hash of the cast to reply to"
                }
            },
            "required": ["text"]
        }),
        move |args: PostCastArgs| {
            let client = Arc::clone(&c);
            async move { post_cast(&client, args).await }
        },
    )?;

    let c = Arc::clone(client);
    registry.register_typed(
        "get_user_casts",
        "Retrieve recent casts from a user.",
        json!({
            "type": "object",
            "properties": {
                "username": {"type": "string", "description": "Warpcast username"},
                "limit": limit_schema()
            },
            "required": ["username"]
        }),
        move |args: UserCastsArgs| {
            let client = Arc::clone(&c);
            async move { get_user_casts(&client, args).await }
        },
    )?;

    let c = Arc::clone(client);
    registry.register_typed(
        "search_casts",
        "Search casts on Warpcast.",
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search query"},
                "limit": limit_schema()
            },
            "required": ["query"]
        }),
        move |args: SearchCastsArgs| {
            let client = Arc::clone(&c);
            async move { search_casts(&client, args).await }
        },
    )?;

    let c = Arc::clone(client);
    registry.register_typed(
        "get_trending_casts",
        "Get trending casts.",
        json!({
            "type": "object",
            "properties": {
                "limit": limit_schema()
            }
        }),
        move |args: TrendingCastsArgs| {
            let client = Arc::clone(&c);
            async move { get_trending_casts(&client, args).await }
        },
    )?;

    Ok(())
}
