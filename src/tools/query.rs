use crate::db::Database;
use crate::db::results::{QueryResult, format_elapsed};
use crate::input::{parse_args, required};
use crate::mcp::errors::ToolError;
use crate::tools::{Render, ToolOutcome};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct QueryArgs {
    #[serde(default)]
    pub sql: Option<String>,
}

impl Render for QueryResult {
    fn render(&self) -> String {
        let payload = serde_json::to_string_pretty(self).unwrap_or_default();
        format!(
            "Query executed successfully in {}\n\nColumns: {}\nRows: {}\n\n{}",
            format_elapsed(&self.elapsed),
            self.columns.join(", "),
            self.count,
            payload
        )
    }
}

pub async fn call(database: &Database, args: &Value) -> Value {
    ToolOutcome::from_result(run(database, args).await).into_value()
}

pub async fn run(database: &Database, args: &Value) -> Result<QueryResult, ToolError> {
    let args: QueryArgs = parse_args(args)?;
    let sql = required(args.sql.as_deref(), "SQL query cannot be empty")?;
    database.query(sql).await
}
