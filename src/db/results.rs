//! Typed results of the database tools, built from a raw [`RowSet`].

use crate::db::value::NormalizedValue;
use crate::mcp::errors::ToolError;
use serde::{Serialize, Serializer};
use std::time::Duration;

/// Columns and rows of one statement, already normalized. Every row has one
/// value per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<NormalizedValue>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<NormalizedValue>>,
    pub count: usize,
    #[serde(rename = "time", serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
}

impl QueryResult {
    pub fn new(set: RowSet, elapsed: Duration) -> Self {
        Self {
            count: set.rows.len(),
            columns: set.columns,
            rows: set.rows,
            elapsed,
        }
    }
}

/// Elapsed time as shown to callers, e.g. `12.5ms`.
pub fn format_elapsed(elapsed: &Duration) -> String {
    format!("{elapsed:?}")
}

fn serialize_elapsed<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_elapsed(elapsed))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableList {
    pub tables: Vec<String>,
    pub count: usize,
}

impl TableList {
    /// `context` names the statement in any scan failure.
    pub fn from_rows(set: RowSet, context: &str) -> Result<Self, ToolError> {
        let column = set
            .columns
            .first()
            .cloned()
            .unwrap_or_else(|| "table".to_string());
        let tables = set
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .next()
                    .and_then(NormalizedValue::into_text)
                    .ok_or_else(|| {
                        ToolError::scan_failure(context, column.as_str(), "table name is NULL")
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            count: tables.len(),
            tables,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    pub field: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(rename = "null")]
    pub nullable: bool,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub extra: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    pub count: usize,
}

const DESCRIBE_COLUMNS: [&str; 6] = ["Field", "Type", "Null", "Key", "Default", "Extra"];

impl TableSchema {
    /// Builds the schema from `DESCRIBE` output. A NULL default stays absent.
    pub fn from_rows(table: &str, set: RowSet, context: &str) -> Result<Self, ToolError> {
        let columns = set
            .rows
            .into_iter()
            .map(|row| column_info(row, context))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            table: table.to_string(),
            count: columns.len(),
            columns,
        })
    }
}

fn column_info(row: Vec<NormalizedValue>, context: &str) -> Result<ColumnInfo, ToolError> {
    if row.len() < DESCRIBE_COLUMNS.len() {
        return Err(ToolError::scan_failure(
            context,
            DESCRIBE_COLUMNS[row.len()],
            format!(
                "expected {} columns from DESCRIBE, got {}",
                DESCRIBE_COLUMNS.len(),
                row.len()
            ),
        ));
    }

    let mut cells = row.into_iter().zip(DESCRIBE_COLUMNS);
    let mut text = |required: bool| -> Result<Option<String>, ToolError> {
        let Some((value, name)) = cells.next() else {
            return Ok(None);
        };
        match value.into_text() {
            Some(text) => Ok(Some(text)),
            None if required => Err(ToolError::scan_failure(context, name, "unexpected NULL")),
            None => Ok(None),
        }
    };

    let field = text(true)?.unwrap_or_default();
    let column_type = text(true)?.unwrap_or_default();
    let nullable = text(true)?.is_some_and(|value| value.eq_ignore_ascii_case("YES"));
    let key = text(false)?.unwrap_or_default();
    let default = text(false)?;
    let extra = text(false)?.unwrap_or_default();

    Ok(ColumnInfo {
        field,
        column_type,
        nullable,
        key,
        default,
        extra,
    })
}
