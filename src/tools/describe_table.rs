use crate::db::Database;
use crate::db::results::TableSchema;
use crate::input::{optional, parse_args, required};
use crate::mcp::errors::ToolError;
use crate::tools::{Render, ToolOutcome};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write;

#[derive(Debug, Default, Deserialize)]
pub struct DescribeTableArgs {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
}

impl Render for TableSchema {
    fn render(&self) -> String {
        let mut out = format!("Table: {}\nColumns: {}\n\n", self.table, self.count);
        out.push_str("Field\tType\tNull\tKey\tDefault\tExtra\n");
        out.push_str(&"-".repeat(80));
        out.push('\n');
        for column in &self.columns {
            let _ = writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}",
                column.field,
                column.column_type,
                if column.nullable { "YES" } else { "NO" },
                column.key,
                column.default.as_deref().unwrap_or("NULL"),
                column.extra
            );
        }
        out
    }
}

pub async fn call(database: &Database, args: &Value) -> Value {
    ToolOutcome::from_result(run(database, args).await).into_value()
}

pub async fn run(database: &Database, args: &Value) -> Result<TableSchema, ToolError> {
    let args: DescribeTableArgs = parse_args(args)?;
    let table = required(args.table.as_deref(), "Table name is required")?;
    database
        .describe_table(table, optional(args.database.as_deref()))
        .await
}
