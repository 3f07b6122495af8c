//! Error strings returned to tool callers.

use mcp::ToolOutput;
use serde_json::Value;

/// Input rejected before any request.
pub const INPUT_VALIDATION: &str = "InputValidation";
/// Server started without a token.
pub const CONFIGURATION: &str = "Configuration";
/// The upstream call failed.
pub const API_ERROR: &str = "APIError";

/// `Error (<kind>): <message>`, plus `\nDetails: <details>` when present.
pub fn format_error(kind: &str, message: &str, details: Option<&str>) -> String {
    let mut response = format!("Error ({kind}): {message}");
    if let Some(details) = details.filter(|d| !d.is_empty()) {
        response.push_str("\nDetails: ");
        response.push_str(details);
    }
    response
}

/// Map a client failure to the tool's error output.
pub(crate) fn client_failure(context: &str, error: &warpcast::Error) -> ToolOutput {
    let text = match error {
        warpcast::Error::Unauthenticated => format_error(CONFIGURATION, &error.to_string(), None),
        warpcast::Error::InvalidIdentifier(_) => {
            format_error(INPUT_VALIDATION, &error.to_string(), None)
        }
        _ => format_error(API_ERROR, context, Some(&error.to_string())),
    };
    tracing::warn!(error = %error, "{context}");
    ToolOutput::Failure(text)
}

/// Pass a payload through, turning client errors and error payloads into
/// failures.
pub(crate) fn payload(context: &str, result: warpcast::Result<Value>) -> ToolOutput {
    match checked(context, result) {
        Ok(value) => ToolOutput::Json(value),
        Err(failure) => failure,
    }
}

/// Like [`payload`] but hands the value back for tools that reshape it.
pub(crate) fn checked(
    context: &str,
    result: warpcast::Result<Value>,
) -> Result<Value, ToolOutput> {
    match result {
        Ok(value) if warpcast::is_error_payload(&value) => {
            let message = value.get("message").and_then(Value::as_str);
            Err(ToolOutput::Failure(format_error(API_ERROR, context, message)))
        }
        Ok(value) => Ok(value),
        Err(e) => Err(client_failure(context, &e)),
    }
}
