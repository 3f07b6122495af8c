//! HTTP transport (axum).
//!
//! Routes:
//!
//! - `POST /mcp`: one JSON-RPC message per request. Notifications are
//!   answered with `202 Accepted` and no body.
//! - `POST /tools/{name}`: invoke one tool directly; the JSON body is the
//!   argument object. An empty body means no arguments.
//! - `GET /health`: liveness plus tool count.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::{McpServer, parse_request};

pub const SESSION_HEADER: &str = "mcp-session-id";

#[derive(Clone)]
struct AppState {
    server: Arc<McpServer>,
}

/// Build the router for a server.
pub fn router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_post))
        .route("/tools/{name}", post(tool_post))
        .route("/health", get(health))
        .with_state(AppState { server })
}

/// Bind `host:port` and serve until the process is stopped.
pub async fn serve_http(server: Arc<McpServer>, host: &str, port: u16) -> Result<()> {
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(addr.as_str())
        .await
        .map_err(|source| Error::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!(
        server = %server.name(),
        tools = server.registry().len(),
        %addr,
        "serving MCP over HTTP"
    );

    axum::serve(listener, router(server).into_make_service()).await?;
    Ok(())
}

async fn mcp_post(State(state): State<AppState>, body: String) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(response) => return (StatusCode::BAD_REQUEST, Json(response)).into_response(),
    };

    let is_initialize = request.method == "initialize";
    let Some(response) = state.server.handle(request).await else {
        return StatusCode::ACCEPTED.into_response();
    };

    let mut http_response = Json(response).into_response();
    if is_initialize {
        if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
            http_response
                .headers_mut()
                .insert(HeaderName::from_static(SESSION_HEADER), value);
        }
    }
    http_response
}

async fn tool_post(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    let arguments = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                return json_error(StatusCode::BAD_REQUEST, &format!("invalid JSON body: {e}"));
            }
        }
    };

    match state.server.registry().invoke(&name, arguments).await {
        Ok(output) => Json(json!({
            "result": output.to_value(),
            "isError": output.is_failure(),
        }))
        .into_response(),
        Err(e @ Error::ToolNotFound(_)) => json_error(StatusCode::NOT_FOUND, &e.to_string()),
        Err(e @ Error::InvalidArguments { .. }) => {
            json_error(StatusCode::BAD_REQUEST, &e.to_string())
        }
        Err(e) => {
            tracing::error!(tool = %name, error = %e, "tool invocation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "tools": state.server.registry().len(),
    }))
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "status": "error",
            "message": message,
        })),
    )
        .into_response()
}
