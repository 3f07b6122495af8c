//! Channel tools.

use std::sync::Arc;

use mcp::{ToolOutput, ToolRegistry};
use serde::Deserialize;
use serde_json::json;
use warpcast::{ChannelAction, DEFAULT_LIMIT, WarpcastClient};

use crate::format::{checked, payload};

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoArgs {}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelArgs {
    pub channel_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelCastsArgs {
    pub channel_id: String,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

pub async fn get_all_channels(client: &WarpcastClient) -> ToolOutput {
    payload("Failed to get channels", client.channels().await)
}

pub async fn get_channel(client: &WarpcastClient, args: ChannelArgs) -> ToolOutput {
    payload("Failed to get channel", client.channel(&args.channel_id).await)
}

pub async fn get_channel_casts(client: &WarpcastClient, args: ChannelCastsArgs) -> ToolOutput {
    payload(
        "Failed to get channel casts",
        client.channel_casts(&args.channel_id, args.limit).await,
    )
}

pub async fn follow_channel(client: &WarpcastClient, args: ChannelArgs) -> ToolOutput {
    change_follow(client, &args.channel_id, ChannelAction::Follow).await
}

pub async fn unfollow_channel(client: &WarpcastClient, args: ChannelArgs) -> ToolOutput {
    change_follow(client, &args.channel_id, ChannelAction::Unfollow).await
}

async fn change_follow(client: &WarpcastClient, channel_id: &str, action: ChannelAction) -> ToolOutput {
    let (context, done) = match action {
        ChannelAction::Follow => ("Failed to follow channel", "Now following channel"),
        ChannelAction::Unfollow => ("Failed to unfollow channel", "Unfollowed channel"),
    };
    match checked(context, client.channel_action(channel_id, action).await) {
        Ok(_) => ToolOutput::Text(format!("{done} {channel_id}")),
        Err(failure) => failure,
    }
}

fn channel_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "channel_id": {"type": "string", "description": "Channel identifier"}
        },
        "required": ["channel_id"]
    })
}

pub(crate) fn register(registry: &mut ToolRegistry, client: &Arc<WarpcastClient>) -> mcp::Result<()> {
    let c = Arc::clone(client);
    registry.register_typed(
        "get_all_channels",
        "Retrieve all channels.",
        json!({"type": "object", "properties": {}}),
        move |_: NoArgs| {
            let client = Arc::clone(&c);
            async move { get_all_channels(&client).await }
        },
    )?;

    let c = Arc::clone(client);
    registry.register_typed(
        "get_channel",
        "Get details for a channel.",
        channel_schema(),
        move |args: ChannelArgs| {
            let client = Arc::clone(&c);
            async move { get_channel(&client, args).await }
        },
    )?;

    let c = Arc::clone(client);
    registry.register_typed(
        "get_channel_casts",
        "Get casts from a channel.",
        json!({
            "type": "object",
            "properties": {
                "channel_id": {"type": "string", "description": "Channel identifier"},
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "default": DEFAULT_LIMIT,
                    "description": "Maximum number of casts to return"
                }
            },
            "required": ["channel_id"]
        }),
        move |args: ChannelCastsArgs| {
            let client = Arc::clone(&c);
            async move { get_channel_casts(&client, args).await }
        },
    )?;

    let c = Arc::clone(client);
    registry.register_typed(
        "follow_channel",
        "Follow a channel.",
        channel_schema(),
        move |args: ChannelArgs| {
            let client = Arc::clone(&c);
            async move { follow_channel(&client, args).await }
        },
    )?;

    let c = Arc::clone(client);
    registry.register_typed(
        "unfollow_channel",
        "Unfollow a channel.",
        channel_schema(),
        move |args: ChannelArgs| {
            let client = Arc::clone(&c);
            async move { unfollow_channel(&client, args).await }
        },
    )?;

    Ok(())
}
