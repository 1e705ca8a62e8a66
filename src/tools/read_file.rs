use crate::extract::{self, Lookup};
use crate::input::{parse_args, required, resolve_path};
use crate::mcp::errors::ToolError;
use crate::tools::{Render, ToolOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;

#[derive(Debug, Default, Deserialize)]
pub struct ReadFileArgs {
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Extracted document. `path` is the path as the caller wrote it; it appears
/// in the narrative only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileContents {
    #[serde(skip)]
    pub path: String,
    pub content: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub format: &'static str,
}

impl Render for FileContents {
    fn render(&self) -> String {
        format!(
            "File: {}\nSize: {} bytes\nType: {}\n\nContent:\n{}",
            self.path, self.size, self.format, self.content
        )
    }
}

pub fn call(args: &Value) -> Value {
    let result = parse_args::<ReadFileArgs>(args).and_then(|args| read(&args));
    ToolOutcome::from_result(result).into_value()
}

pub fn read(args: &ReadFileArgs) -> Result<FileContents, ToolError> {
    let requested = required(args.file_path.as_deref(), "File path is required")?;
    let path = resolve_path(requested)?;
    let extension = extract::extension_of(&path);

    let lookup = extract::lookup(&extension);
    if let Lookup::Legacy = lookup {
        return Err(ToolError::UnsupportedFormat(requested.to_string()));
    }

    let metadata = fs::metadata(&path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => ToolError::NotFound(requested.to_string()),
        _ => ToolError::AccessDenied {
            path: requested.to_string(),
            source,
        },
    })?;
    if !metadata.is_file() {
        return Err(ToolError::invalid_argument(format!(
            "Not a regular file: {requested}"
        )));
    }

    let Lookup::Supported(strategy) = lookup else {
        return Err(ToolError::UnknownFormat {
            path: requested.to_string(),
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                format!(".{extension}")
            },
            supported: extract::supported_extensions(),
        });
    };

    let content = (strategy.extract)(&path)?;
    Ok(FileContents {
        path: requested.to_string(),
        content,
        size: metadata.len(),
        format: strategy.tag,
    })
}
