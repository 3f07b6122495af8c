//! Tool registry: named handlers populated once at startup.

use std::collections::HashMap;
use std::future::Future;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::protocol::{CallToolResult, Tool, ToolContent};

/// What a tool hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Human-readable result.
    Text(String),
    /// Upstream payload passed through unchanged.
    Json(Value),
    /// Formatted error string; the call itself still completed.
    Failure(String),
}

impl ToolOutput {
    pub fn is_failure(&self) -> bool {
        matches!(self, ToolOutput::Failure(_))
    }

    /// Text of a `Text` or `Failure` output.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ToolOutput::Text(text) | ToolOutput::Failure(text) => Some(text),
            ToolOutput::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ToolOutput::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Plain JSON view used by the per-tool HTTP routes.
    pub fn to_value(&self) -> Value {
        match self {
            ToolOutput::Text(text) | ToolOutput::Failure(text) => Value::String(text.clone()),
            ToolOutput::Json(value) => value.clone(),
        }
    }

    /// Render as an MCP `tools/call` result.
    pub fn into_call_result(self) -> CallToolResult {
        let is_error = self.is_failure();
        let text = match self {
            ToolOutput::Text(text) | ToolOutput::Failure(text) => text,
            ToolOutput::Json(value) => {
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
            }
        };
        CallToolResult {
            content: vec![ToolContent::text(text)],
            is_error,
        }
    }
}

type Handler = Box<dyn Fn(Value) -> Result<BoxFuture<'static, ToolOutput>> + Send + Sync>;

/// A tool definition paired with its handler.
struct RegisteredTool {
    tool: Tool,
    handler: Handler,
}

/// Name → handler mapping.
///
/// Built by explicit [`register`](Self::register) calls and then shared
/// read-only (typically behind an `Arc`). Listing keeps registration order.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler that receives the raw JSON arguments.
    pub fn register<F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) -> Result<()>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        let handler: Handler = Box::new(move |args| Ok(handler(args).boxed()));
        self.insert(name.into(), description.into(), input_schema, handler)
    }

    /// Register a handler whose arguments are decoded into `A` first.
    ///
    /// Arguments that do not decode are rejected with
    /// [`Error::InvalidArguments`] and the handler is not called.
    pub fn register_typed<A, F, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        handler: F,
    ) -> Result<()>
    where
        A: DeserializeOwned + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        let name = name.into();
        let tool_name = name.clone();
        let handler: Handler = Box::new(move |args| {
            let args: A = serde_json::from_value(args).map_err(|e| Error::InvalidArguments {
                tool: tool_name.clone(),
                message: e.to_string(),
            })?;
            Ok(handler(args).boxed())
        });
        self.insert(name, description.into(), input_schema, handler)
    }

    fn insert(
        &mut self,
        name: String,
        description: String,
        input_schema: Value,
        handler: Handler,
    ) -> Result<()> {
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateTool(name));
        }
        self.index.insert(name.clone(), self.tools.len());
        self.tools.push(RegisteredTool {
            tool: Tool {
                name,
                description: Some(description),
                input_schema,
            },
            handler,
        });
        Ok(())
    }

    /// List all tools in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|entry| entry.tool.clone()).collect()
    }

    /// Get a tool definition by name.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&i| &self.tools[i].tool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Call a tool by name.
    ///
    /// Missing or `null` arguments are treated as an empty object.
    pub async fn invoke(&self, name: &str, arguments: Option<Value>) -> Result<ToolOutput> {
        let entry = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        let args = match arguments {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(args) => args,
        };

        let call = (entry.handler)(args)?;
        Ok(call.await)
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.iter().map(|t| &t.tool.name).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct EchoArgs {
        text: String,
        #[serde(default)]
        repeat: Option<usize>,
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register_typed("echo", "Echo text back", json!({"type": "object"}), |args: EchoArgs| async move {
                ToolOutput::Text(args.text.repeat(args.repeat.unwrap_or(1)))
            })
            .unwrap();
        registry
            .register("raw", "Return arguments", json!({"type": "object"}), |args| async move {
                ToolOutput::Json(args)
            })
            .unwrap();
        registry
    }

    #[test]
    fn empty_registry_has_no_tools() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.tools().is_empty());
    }

    #[test]
    fn lists_tools_in_registration_order() {
        let registry = registry();
        let names: Vec<_> = registry.tools().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["echo", "raw"]);
        assert_eq!(
            registry.get("echo").and_then(|t| t.description.as_deref()),
            Some("Echo text back")
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        let err = registry
            .register("echo", "again", json!({}), |_| async { ToolOutput::Text(String::new()) })
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateTool(name) if name == "echo"));
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn invoke_decodes_typed_arguments() {
        let registry = registry();
        let output = registry
            .invoke("echo", Some(json!({"text": "ab", "repeat": 2})))
            .await
            .unwrap();
        assert_eq!(output, ToolOutput::Text("abab".to_string()));
    }

    #[tokio::test]
    async fn invoke_treats_missing_arguments_as_empty_object() {
        let registry = registry();
        let output = registry.invoke("raw", None).await.unwrap();
        assert_eq!(output, ToolOutput::Json(json!({})));
    }

    #[tokio::test]
    async fn invoke_rejects_bad_arguments() {
        let registry = registry();
        let err = registry.invoke("echo", Some(json!({"repeat": 1}))).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArguments { tool, .. } if tool == "echo"));
    }

    #[tokio::test]
    async fn invoke_unknown_tool() {
        let registry = registry();
        let err = registry.invoke("missing", None).await.unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(name) if name == "missing"));
    }

    #[test]
    fn failure_output_marks_call_result_as_error() {
        let result = ToolOutput::Failure("Error (APIError): boom".into()).into_call_result();
        assert!(result.is_error);
        assert_eq!(result.content[0].as_text(), Some("Error (APIError): boom"));

        let result = ToolOutput::Json(json!({"casts": []})).into_call_result();
        assert!(!result.is_error);
        let text = result.content[0].as_text().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), json!({"casts": []}));
    }
}
