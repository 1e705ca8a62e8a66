use serde_json::json;

pub const TOOL_READ_FILE: &str = "read_file";
pub const TOOL_QUERY: &str = "query";
pub const TOOL_LIST_TABLES: &str = "list_tables";
pub const TOOL_DESCRIBE_TABLE: &str = "describe_table";

pub fn read_file_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "file_path": {
                "type": "string",
                "description": "Path to the file to read (supports .pdf, .docx, .txt, .md; .doc must be converted first)"
            }
        },
        "required": ["file_path"]
    })
}

pub fn read_file_output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "content": { "type": "string" },
            "size": { "type": "integer" },
            "type": { "type": "string", "enum": ["text", "pdf", "docx"] }
        },
        "required": ["content", "size", "type"]
    })
}

pub fn query_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "sql": { "type": "string", "description": "SQL query to execute" }
        },
        "required": ["sql"]
    })
}

pub fn query_output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "columns": { "type": "array", "items": { "type": "string" } },
            "rows": {
                "type": "array",
                "items": {
                    "type": "array",
                    "items": { "type": ["string", "number", "boolean", "null"] }
                }
            },
            "count": { "type": "integer", "minimum": 0 },
            "time": { "type": "string" }
        },
        "required": ["columns", "rows", "count", "time"]
    })
}

pub fn list_tables_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "database": {
                "type": "string",
                "description": "Database name (optional, uses default if not specified)"
            }
        }
    })
}

pub fn list_tables_output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "tables": { "type": "array", "items": { "type": "string" } },
            "count": { "type": "integer", "minimum": 0 }
        },
        "required": ["tables", "count"]
    })
}

pub fn describe_table_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "table": { "type": "string", "description": "Table name to describe" },
            "database": { "type": "string", "description": "Database name (optional)" }
        },
        "required": ["table"]
    })
}

pub fn describe_table_output_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "table": { "type": "string" },
            "columns": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "field": { "type": "string" },
                        "type": { "type": "string" },
                        "null": { "type": "boolean" },
                        "key": { "type": "string" },
                        "default": { "type": "string" },
                        "extra": { "type": "string" }
                    },
                    "required": ["field", "type", "null", "key", "extra"]
                }
            },
            "count": { "type": "integer", "minimum": 0 }
        },
        "required": ["table", "columns", "count"]
    })
}
