use crate::mcp::errors::ToolError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Deserializes tool arguments into their typed form. Missing arguments are
/// treated as an empty object; unknown fields are ignored.
pub fn parse_args<T: DeserializeOwned>(args: &Value) -> Result<T, ToolError> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        Value::Object(_) => args.clone(),
        _ => return Err(ToolError::invalid_argument("arguments must be an object")),
    };
    serde_json::from_value(args)
        .map_err(|err| ToolError::invalid_argument(format!("invalid arguments: {err}")))
}

/// Returns the trimmed value of a required string field, rejecting empty and
/// whitespace-only input with `message`.
pub fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ToolError> {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ToolError::invalid_argument(message)),
    }
}

/// Trimmed optional field; blank counts as absent.
pub fn optional(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Resolves `path` against the working directory as it is at call time.
pub fn resolve_path(path: &str) -> Result<PathBuf, ToolError> {
    let path = Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    std::path::absolute(path).map_err(|err| {
        ToolError::Internal(format!("failed to get current directory: {err}"))
    })
}
