//! The contract every tool satisfies: typed arguments in, a [`ToolOutcome`]
//! out. A success carries a structured payload plus the narrative rendered
//! from that same payload; a failure carries only the error message.

use crate::mcp::errors::ToolError;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

pub mod describe_table;
pub mod list_tables;
pub mod query;
pub mod read_file;

/// Human-readable rendering of a structured result.
pub trait Render {
    fn render(&self) -> String;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub narrative: String,
    pub structured: Option<Value>,
    pub is_error: bool,
}

impl ToolOutcome {
    pub fn success<T: Serialize + Render>(output: &T) -> Self {
        match serde_json::to_value(output) {
            Ok(structured) => Self {
                narrative: output.render(),
                structured: Some(structured),
                is_error: false,
            },
            Err(err) => Self::failure(&ToolError::Internal(format!(
                "failed to serialize result: {err}"
            ))),
        }
    }

    pub fn failure(error: &ToolError) -> Self {
        warn!(kind = error.kind(), error = %error, "tool call failed");
        Self {
            narrative: format!("Error: {error}"),
            structured: None,
            is_error: true,
        }
    }

    pub fn from_result<T: Serialize + Render>(result: Result<T, ToolError>) -> Self {
        match result {
            Ok(output) => Self::success(&output),
            Err(error) => Self::failure(&error),
        }
    }

    /// MCP `CallToolResult` form. `structuredContent` is omitted on error.
    pub fn into_value(self) -> Value {
        let mut result = json!({
            "content": [{"type": "text", "text": self.narrative}],
            "isError": self.is_error
        });
        if let Some(structured) = self.structured
            && let Some(obj) = result.as_object_mut()
        {
            obj.insert("structuredContent".to_string(), structured);
        }
        result
    }
}

pub fn error_result(error: ToolError) -> Value {
    ToolOutcome::failure(&error).into_value()
}
