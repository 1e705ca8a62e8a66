//! Format-specific text extraction.
//!
//! Each supported extension maps to a [`Strategy`]: a format tag plus a
//! function from a path known to exist to its extracted text. Adding a format
//! means adding a row to [`STRATEGIES`]; the `read_file` tool never branches on
//! formats itself.

use crate::mcp::errors::ToolError;
use std::fs::File;
use std::io;
use std::path::Path;

pub mod docx;
pub mod pdf;
pub mod text;

pub type ExtractFn = fn(&Path) -> Result<String, ToolError>;

#[derive(Clone, Copy)]
pub struct Strategy {
    pub extensions: &'static [&'static str],
    pub tag: &'static str,
    pub extract: ExtractFn,
}

pub const STRATEGIES: &[Strategy] = &[
    Strategy {
        extensions: &["txt", "md"],
        tag: "text",
        extract: text::extract,
    },
    Strategy {
        extensions: &["pdf"],
        tag: "pdf",
        extract: pdf::extract,
    },
    Strategy {
        extensions: &["docx"],
        tag: "docx",
        extract: docx::extract,
    },
];

/// Recognized but deliberately unsupported extensions.
pub const LEGACY_EXTENSIONS: &[&str] = &["doc"];

#[derive(Clone, Copy)]
pub enum Lookup {
    Supported(&'static Strategy),
    Legacy,
    Unknown,
}

/// Lowercased extension without the dot, or empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

pub fn lookup(extension: &str) -> Lookup {
    if LEGACY_EXTENSIONS.contains(&extension) {
        return Lookup::Legacy;
    }
    STRATEGIES
        .iter()
        .find(|strategy| strategy.extensions.contains(&extension))
        .map_or(Lookup::Unknown, Lookup::Supported)
}

/// The supported set as shown to callers, e.g. `.txt, .md, .pdf, .docx`.
pub fn supported_extensions() -> String {
    STRATEGIES
        .iter()
        .flat_map(|strategy| strategy.extensions.iter())
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Opens `path` for a binary format reader. A permission problem is an
/// access failure; any other open error means the file is not a readable
/// `format`.
pub fn open(path: &Path, format: &'static str) -> Result<File, ToolError> {
    File::open(path).map_err(|err| open_error(path, format, err))
}

fn open_error(path: &Path, format: &'static str, err: io::Error) -> ToolError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => ToolError::AccessDenied {
            path: path.display().to_string(),
            source: err,
        },
        _ => ToolError::ParseFailure {
            format,
            path: path.display().to_string(),
            reason: format!("failed to open: {err}"),
        },
    }
}
