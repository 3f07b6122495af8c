//! MCP request dispatch and the stdio transport.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::{Error, Result};
use crate::protocol::{
    CallToolParams, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, ListToolsResult, PROTOCOL_VERSION, RequestId, ServerCapabilities,
    ServerInfo, ToolsCapability,
};
use crate::registry::ToolRegistry;

/// Maximum accepted message size (1MB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Parse one JSON-RPC message.
///
/// On failure, returns the error response that should be sent back.
pub fn parse_request(raw: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    if raw.len() > MAX_MESSAGE_SIZE {
        return Err(JsonRpcResponse::failure(
            None,
            JsonRpcError::invalid_request(format!(
                "message too large: {} bytes (max {MAX_MESSAGE_SIZE})",
                raw.len()
            )),
        ));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|e| JsonRpcResponse::failure(None, JsonRpcError::parse_error(e)))?;

    // Recover the id (if any) so the error can be correlated.
    let id = value
        .get("id")
        .cloned()
        .and_then(|id| serde_json::from_value::<RequestId>(id).ok());

    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| JsonRpcResponse::failure(id.clone(), JsonRpcError::invalid_request(e)))?;

    if request.jsonrpc != "2.0" {
        return Err(JsonRpcResponse::failure(
            id,
            JsonRpcError::invalid_request(format!("unsupported jsonrpc version {:?}", request.jsonrpc)),
        ));
    }

    Ok(request)
}

/// An MCP server exposing the tools of one registry.
#[derive(Debug)]
pub struct McpServer {
    info: ServerInfo,
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            registry,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Handle one raw message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        match parse_request(raw) {
            Ok(request) => self.handle(request).await,
            Err(response) => Some(response),
        }
    }

    /// Handle a parsed request. Returns `None` for notifications.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "notification");
            return None;
        };

        tracing::debug!(method = %request.method, ?id, "request");

        let outcome = match request.method.as_str() {
            "initialize" => self.initialize(request.params),
            "ping" => Ok(Value::Object(Default::default())),
            "tools/list" => to_result(ListToolsResult {
                tools: self.registry.tools(),
            }),
            "tools/call" => self.call_tool(request.params).await,
            method => Err(JsonRpcError::method_not_found(method)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(Some(id), result),
            Err(error) => JsonRpcResponse::failure(Some(id), error),
        })
    }

    fn initialize(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let params: InitializeParams = match params {
            Some(params) => serde_json::from_value(params).map_err(JsonRpcError::invalid_params)?,
            None => InitializeParams::default(),
        };

        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                version = client.version.as_deref().unwrap_or("unknown"),
                requested = params.protocol_version.as_deref().unwrap_or("none"),
                "client connected"
            );
        }

        to_result(InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
            server_info: self.info.clone(),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> std::result::Result<Value, JsonRpcError> {
        let params = params.ok_or_else(|| JsonRpcError::invalid_params("missing params"))?;
        let params: CallToolParams =
            serde_json::from_value(params).map_err(JsonRpcError::invalid_params)?;

        match self.registry.invoke(&params.name, params.arguments).await {
            Ok(output) => {
                if output.is_failure() {
                    tracing::warn!(tool = %params.name, "tool reported failure");
                }
                to_result(output.into_call_result())
            }
            Err(e @ (Error::ToolNotFound(_) | Error::InvalidArguments { .. })) => {
                Err(JsonRpcError::invalid_params(e))
            }
            Err(e) => Err(JsonRpcError::internal(e)),
        }
    }

    /// Serve newline-delimited JSON-RPC until the reader hits EOF.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(line).await {
                let mut json = serde_json::to_string(&response)?;
                json.push('\n');
                writer.write_all(json.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Serve on the process stdin/stdout.
    pub async fn serve_stdio(&self) -> Result<()> {
        tracing::info!(server = %self.info.name, tools = self.registry.len(), "serving MCP over stdio");
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }
}

fn to_result(value: impl Serialize) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(JsonRpcError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolOutput;
    use serde_json::json;

    fn server() -> McpServer {
        let mut registry = ToolRegistry::new();
        registry
            .register("greet", "Say hello", json!({"type": "object"}), |args| async move {
                let name = args.get("name").and_then(Value::as_str).unwrap_or("world");
                ToolOutput::Text(format!("Hello, {name}!"))
            })
            .unwrap();
        registry
            .register("fail", "Always fails", json!({"type": "object"}), |_| async {
                ToolOutput::Failure("Error (APIError): nope".to_string())
            })
            .unwrap();
        McpServer::new("test-server", "1.2.3", Arc::new(registry))
    }

    fn result(response: Option<JsonRpcResponse>) -> Value {
        response.expect("expected a response").into_result().unwrap()
    }

    fn error(response: Option<JsonRpcResponse>) -> JsonRpcError {
        response.expect("expected a response").into_result().unwrap_err()
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let server = server();
        let request = JsonRpcRequest::new(1i64, "initialize").with_params(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "inspector", "version": "0.1"}
        }));
        let value = result(server.handle(request).await);
        assert_eq!(value["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(value["serverInfo"]["name"], "test-server");
        assert_eq!(value["serverInfo"]["version"], "1.2.3");
        assert!(value["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let server = server();
        let request = JsonRpcRequest::notification("notifications/initialized");
        assert!(server.handle(request).await.is_none());
    }

    #[tokio::test]
    async fn lists_registered_tools() {
        let server = server();
        let value = result(server.handle(JsonRpcRequest::new(2i64, "tools/list")).await);
        let names: Vec<_> = value["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["greet", "fail"]);
        assert_eq!(value["tools"][0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn calls_tool() {
        let server = server();
        let request = JsonRpcRequest::new("abc", "tools/call")
            .with_params(json!({"name": "greet", "arguments": {"name": "cast"}}));
        let response = server.handle(request).await.unwrap();
        assert_eq!(response.id, Some(RequestId::from("abc")));
        let value = response.into_result().unwrap();
        assert_eq!(value["content"][0]["text"], "Hello, cast!");
        assert_eq!(value["isError"], false);
    }

    #[tokio::test]
    async fn tool_failure_sets_is_error() {
        let server = server();
        let request = JsonRpcRequest::new(3i64, "tools/call").with_params(json!({"name": "fail"}));
        let value = result(server.handle(request).await);
        assert_eq!(value["isError"], true);
        assert_eq!(value["content"][0]["text"], "Error (APIError): nope");
    }

    #[tokio::test]
    async fn unknown_tool_is_invalid_params() {
        let server = server();
        let request =
            JsonRpcRequest::new(4i64, "tools/call").with_params(json!({"name": "missing"}));
        let err = error(server.handle(request).await);
        assert_eq!(err.code, JsonRpcError::INVALID_PARAMS);
        assert!(err.message.contains("missing"));
    }

    #[tokio::test]
    async fn unknown_method() {
        let server = server();
        let err = error(server.handle(JsonRpcRequest::new(5i64, "resources/list")).await);
        assert_eq!(err.code, JsonRpcError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_json_is_parse_error() {
        let server = server();
        let response = server.handle_message("{not json").await.unwrap();
        assert!(response.id.is_none());
        assert_eq!(response.into_result().unwrap_err().code, JsonRpcError::PARSE_ERROR);
    }

    #[tokio::test]
    async fn missing_method_is_invalid_request() {
        let server = server();
        let response = server.handle_message(r#"{"jsonrpc":"2.0","id":9}"#).await.unwrap();
        assert_eq!(response.id, Some(RequestId::Number(9)));
        assert_eq!(
            response.into_result().unwrap_err().code,
            JsonRpcError::INVALID_REQUEST
        );
    }

    #[tokio::test]
    async fn wrong_version_is_invalid_request() {
        let err = parse_request(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#).unwrap_err();
        assert_eq!(err.into_result().unwrap_err().code, JsonRpcError::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn serve_answers_requests_line_by_line() {
        let server = server();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"greet"}}"#,
            "\n",
        );
        let mut output = Vec::new();
        server.serve(input.as_bytes(), &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["result"], json!({}));
        assert_eq!(lines[1]["id"], 2);
        assert_eq!(lines[1]["result"]["content"][0]["text"], "Hello, world!");
    }
}
