use serde_json::json;

pub mod contracts;
pub mod errors;

pub fn document_tool_definitions() -> Vec<serde_json::Value> {
    vec![json!({
        "name": contracts::TOOL_READ_FILE,
        "description": "Read content from local files. Supports .txt, .md, .pdf, and .docx files",
        "inputSchema": contracts::read_file_schema(),
        "outputSchema": contracts::read_file_output_schema()
    })]
}

pub fn database_tool_definitions() -> Vec<serde_json::Value> {
    vec![
        json!({
            "name": contracts::TOOL_QUERY,
            "description": "Execute a SQL query on Doris database and return results",
            "inputSchema": contracts::query_schema(),
            "outputSchema": contracts::query_output_schema()
        }),
        json!({
            "name": contracts::TOOL_LIST_TABLES,
            "description": "List all tables in the specified database (or default database if not specified)",
            "inputSchema": contracts::list_tables_schema(),
            "outputSchema": contracts::list_tables_output_schema()
        }),
        json!({
            "name": contracts::TOOL_DESCRIBE_TABLE,
            "description": "Get the structure and column information of a table",
            "inputSchema": contracts::describe_table_schema(),
            "outputSchema": contracts::describe_table_output_schema()
        }),
    ]
}
