//! Tool result rendering.
//!
//! Every tool answers with a JSON object. Successes carry `"success": true`
//! plus their fields; failures are error results whose body is a
//! [`ToolFailure`].

use deckhand_kernel::DeckError;
use rmcp::model::{CallToolResult, Content};
use serde_json::{Map, Value};
use tracing::warn;

use crate::models::{ToolError, ToolFailure};

/// Success result: `fields` merged after `"success": true`.
pub fn success(fields: Value) -> CallToolResult {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    match fields {
        Value::Object(map) => body.extend(map),
        Value::Null => {}
        other => {
            body.insert("result".into(), other);
        }
    }
    CallToolResult::success(vec![Content::text(Value::Object(body).to_string())])
}

pub fn failure(tool: &str, err: &DeckError) -> CallToolResult {
    warn!(tool, kind = %err.kind(), "{err}");
    let body = ToolFailure {
        success: false,
        error: ToolError {
            kind: err.kind().as_str().to_string(),
            message: err.to_string(),
        },
    };
    let text = serde_json::to_string(&body)
        .unwrap_or_else(|_| r#"{"success":false,"error":{"kind":"backend_failure","message":"unserializable error"}}"#.into());
    CallToolResult::error(vec![Content::text(text)])
}

/// Render a dispatcher result.
pub fn respond<T>(
    tool: &str,
    result: deckhand_kernel::Result<T>,
    fields: impl FnOnce(T) -> Value,
) -> CallToolResult {
    match result {
        Ok(v) => success(fields(v)),
        Err(e) => failure(tool, &e),
    }
}
