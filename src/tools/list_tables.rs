use crate::db::Database;
use crate::db::results::TableList;
use crate::input::{optional, parse_args};
use crate::mcp::errors::ToolError;
use crate::tools::{Render, ToolOutcome};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct ListTablesArgs {
    #[serde(default)]
    pub database: Option<String>,
}

impl Render for TableList {
    fn render(&self) -> String {
        format!("Found {} tables:\n{}", self.count, self.tables.join("\n"))
    }
}

pub async fn call(database: &Database, args: &Value) -> Value {
    ToolOutcome::from_result(run(database, args).await).into_value()
}

pub async fn run(database: &Database, args: &Value) -> Result<TableList, ToolError> {
    let args: ListTablesArgs = parse_args(args)?;
    database.list_tables(optional(args.database.as_deref())).await
}
