use std::io;
use thiserror::Error;

pub const INVALID_ARGUMENT: &str = "invalid_argument";
pub const NOT_FOUND: &str = "not_found";
pub const ACCESS_DENIED: &str = "access_denied";
pub const UNSUPPORTED_FORMAT: &str = "unsupported_format";
pub const UNKNOWN_FORMAT: &str = "unknown_format";
pub const PARSE_FAILED: &str = "parse_failed";
pub const CONNECTION_UNAVAILABLE: &str = "connection_unavailable";
pub const QUERY_FAILED: &str = "query_failed";
pub const SCAN_FAILED: &str = "scan_failed";
pub const INTERNAL_ERROR: &str = "internal_error";

/// Every way a tool call can fail. The `Display` text is what the caller sees
/// in the narrative channel, so each message names the offending input.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Failed to access file {path}: {source}")]
    AccessDenied {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Old .doc format is not supported ({0}). Please convert to .docx format first")]
    UnsupportedFormat(String),

    #[error("Unsupported file type: {extension} ({path}). Supported types: {supported}")]
    UnknownFormat {
        path: String,
        extension: String,
        supported: String,
    },

    #[error("Failed to read {format} {path}: {reason}")]
    ParseFailure {
        format: &'static str,
        path: String,
        reason: String,
    },

    #[error("Database connection unavailable ({context}): {reason}")]
    ConnectionUnavailable { context: String, reason: String },

    #[error("{context}: {reason}")]
    QueryFailure { context: String, reason: String },

    #[error("{context}: failed to scan column `{column}`: {reason}")]
    ScanFailure {
        context: String,
        column: String,
        reason: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidArgument(_) => INVALID_ARGUMENT,
            ToolError::NotFound(_) => NOT_FOUND,
            ToolError::AccessDenied { .. } => ACCESS_DENIED,
            ToolError::UnsupportedFormat(_) => UNSUPPORTED_FORMAT,
            ToolError::UnknownFormat { .. } => UNKNOWN_FORMAT,
            ToolError::ParseFailure { .. } => PARSE_FAILED,
            ToolError::ConnectionUnavailable { .. } => CONNECTION_UNAVAILABLE,
            ToolError::QueryFailure { .. } => QUERY_FAILED,
            ToolError::ScanFailure { .. } => SCAN_FAILED,
            ToolError::Internal(_) => INTERNAL_ERROR,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ToolError::InvalidArgument(message.into())
    }

    pub fn query_failure(context: impl Into<String>, reason: impl ToString) -> Self {
        ToolError::QueryFailure {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub fn connection_unavailable(context: impl Into<String>, reason: impl ToString) -> Self {
        ToolError::ConnectionUnavailable {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub fn scan_failure(
        context: impl Into<String>,
        column: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        ToolError::ScanFailure {
            context: context.into(),
            column: column.into(),
            reason: reason.to_string(),
        }
    }
}
