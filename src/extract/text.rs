use crate::mcp::errors::ToolError;
use std::fs;
use std::path::Path;

pub fn extract(path: &Path) -> Result<String, ToolError> {
    let bytes = fs::read(path).map_err(|source| ToolError::AccessDenied {
        path: path.display().to_string(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
