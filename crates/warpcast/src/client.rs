//! Warpcast REST client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, Url};
use serde_json::{Map, Value, json};

use crate::config::ClientConfig;
use crate::{Error, Result};

/// Derive the request headers for a token.
///
/// `Authorization: Bearer <token>` when a token is given, empty otherwise.
pub fn auth_headers(token: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::Config(format!("invalid API token: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Follow-state change on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelAction {
    Follow,
    Unfollow,
}

impl ChannelAction {
    /// Final path segment under `/channels/{id}/`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Unfollow => "unfollow",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Self::Follow => "Could not follow channel",
            Self::Unfollow => "Could not unfollow channel",
        }
    }
}

impl std::fmt::Display for ChannelAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for creating a Warpcast client.
#[derive(Debug, Clone, Default)]
pub struct WarpcastClientBuilder {
    config: ClientConfig,
}

impl WarpcastClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn propagate_errors(mut self, propagate: bool) -> Self {
        self.config.propagate_errors = propagate;
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<WarpcastClient> {
        WarpcastClient::new(self.config)
    }
}

/// Client for the Warpcast API.
///
/// Each operation issues exactly one request. Immutable after construction,
/// so one instance can be shared across tasks behind an `Arc`.
#[derive(Debug)]
pub struct WarpcastClient {
    http: reqwest::Client,
    config: ClientConfig,
    base_url: Url,
    headers: HeaderMap,
}

impl WarpcastClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "base URL {:?} cannot carry a path",
                config.base_url
            )));
        }

        let headers = auth_headers(config.token.as_deref())?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            base_url,
            headers,
        })
    }

    pub fn builder() -> WarpcastClientBuilder {
        WarpcastClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Headers attached to every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn has_token(&self) -> bool {
        self.config.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Create a new cast, optionally as a reply to `parent`.
    pub async fn post_cast(&self, text: &str, parent: Option<&str>) -> Result<Value> {
        let mut body = json!({ "text": text });
        if let Some(parent) = parent.filter(|p| !p.is_empty()) {
            body["parent"] = Value::String(parent.to_string());
        }
        self.send(Method::POST, &["casts"], &[], Some(&body), "Could not post cast")
            .await
    }

    /// Recent casts from one user.
    pub async fn user_casts(&self, username: &str, limit: u32) -> Result<Value> {
        self.send(
            Method::GET,
            &["users", username, "casts"],
            &[("limit", limit.to_string())],
            None,
            "Could not fetch user casts",
        )
        .await
    }

    pub async fn search_casts(&self, query: &str, limit: u32) -> Result<Value> {
        self.send(
            Method::GET,
            &["casts", "search"],
            &[("q", query.to_string()), ("limit", limit.to_string())],
            None,
            "Could not search casts",
        )
        .await
    }

    pub async fn trending_casts(&self, limit: u32) -> Result<Value> {
        self.send(
            Method::GET,
            &["casts", "trending"],
            &[("limit", limit.to_string())],
            None,
            "Could not fetch trending casts",
        )
        .await
    }

    pub async fn channels(&self) -> Result<Value> {
        self.send(Method::GET, &["channels"], &[], None, "Could not fetch channels")
            .await
    }

    pub async fn channel(&self, channel_id: &str) -> Result<Value> {
        self.send(
            Method::GET,
            &["channels", channel_id],
            &[],
            None,
            "Could not fetch channel",
        )
        .await
    }

    pub async fn channel_casts(&self, channel_id: &str, limit: u32) -> Result<Value> {
        self.send(
            Method::GET,
            &["channels", channel_id, "casts"],
            &[("limit", limit.to_string())],
            None,
            "Could not fetch channel casts",
        )
        .await
    }

    pub async fn follow_channel(&self, channel_id: &str) -> Result<Value> {
        self.channel_action(channel_id, ChannelAction::Follow).await
    }

    pub async fn unfollow_channel(&self, channel_id: &str) -> Result<Value> {
        self.channel_action(channel_id, ChannelAction::Unfollow).await
    }

    /// `POST /channels/{id}/{action}`.
    pub async fn channel_action(&self, channel_id: &str, action: ChannelAction) -> Result<Value> {
        self.send(
            Method::POST,
            &["channels", channel_id, action.as_str()],
            &[],
            None,
            action.failure_message(),
        )
        .await
    }

    /// Full URL for a path under the base URL.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
        failure: &'static str,
    ) -> Result<Value> {
        if let Some(segment) = segments.iter().find(|s| !is_plain_segment(s)) {
            return Err(Error::InvalidIdentifier((*segment).to_string()));
        }
        if !self.has_token() {
            return Err(Error::Unauthenticated);
        }

        let url = self.endpoint(segments, query);
        tracing::debug!(%method, path = url.path(), "warpcast request");

        match self.execute(method, url, body).await {
            Ok(value) => Ok(value),
            Err(e) if self.config.propagate_errors => Err(e),
            Err(e) => {
                tracing::error!(error = %e, "{failure}");
                Ok(json!({ "status": "error", "message": format!("{failure}: {e}") }))
            }
        }
    }

    async fn execute(&self, method: Method, url: Url, body: Option<&Value>) -> Result<Value> {
        let mut req = self.http.request(method, url).headers(self.headers.clone());
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Object(Map::new()));
        }

        serde_json::from_slice(&bytes).map_err(|e| Error::Decode(e.to_string()))
    }
}

/// URL path building drops `.` and `..` segments and an empty one leaves a
/// bare slash, so none of them may come from a caller.
fn is_plain_segment(segment: &str) -> bool {
    !matches!(segment, "" | "." | "..")
}

/// True if `value` is the payload a non-propagating client returns on failure.
pub fn is_error_payload(value: &Value) -> bool {
    value.get("status").and_then(Value::as_str) == Some("error")
}
