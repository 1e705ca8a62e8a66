use crate::db::Database;
use crate::mcp::{self, contracts, errors::ToolError};
use crate::tools::{self, error_result};
use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};
use tracing::{debug, info};

pub const PROTOCOL_VERSION: &str = "2025-11-25";

pub enum ToolSet {
    Documents,
    Database(Database),
}

/// Routes a tool name to its implementation for one kind of server.
pub struct Dispatcher {
    tools: ToolSet,
}

impl Dispatcher {
    pub fn documents() -> Self {
        Self {
            tools: ToolSet::Documents,
        }
    }

    pub fn database(database: Database) -> Self {
        Self {
            tools: ToolSet::Database(database),
        }
    }

    pub fn tool_definitions(&self) -> Vec<Value> {
        match self.tools {
            ToolSet::Documents => mcp::document_tool_definitions(),
            ToolSet::Database(_) => mcp::database_tool_definitions(),
        }
    }

    pub async fn call(&self, name: &str, args: Value) -> Value {
        match (&self.tools, name) {
            (ToolSet::Documents, contracts::TOOL_READ_FILE) => {
                tokio::task::spawn_blocking(move || tools::read_file::call(&args))
                    .await
                    .unwrap_or_else(|err| {
                        error_result(ToolError::Internal(format!("read_file task failed: {err}")))
                    })
            }
            (ToolSet::Database(database), contracts::TOOL_QUERY) => {
                tools::query::call(database, &args).await
            }
            (ToolSet::Database(database), contracts::TOOL_LIST_TABLES) => {
                tools::list_tables::call(database, &args).await
            }
            (ToolSet::Database(database), contracts::TOOL_DESCRIBE_TABLE) => {
                tools::describe_table::call(database, &args).await
            }
            _ => error_result(ToolError::invalid_argument(format!(
                "tool not implemented: {name}"
            ))),
        }
    }

    pub async fn shutdown(&self) {
        if let ToolSet::Database(database) = &self.tools {
            database.close().await;
        }
    }
}

/// NDJSON JSON-RPC over stdin/stdout. Each `tools/call` runs on its own task
/// and answers as soon as it finishes; `notifications/cancelled` aborts the
/// matching task. On EOF, in-flight calls are drained before returning.
pub async fn run_stdio(dispatcher: Dispatcher) -> Result<()> {
    let dispatcher = Arc::new(dispatcher);
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = rx.recv().await {
            let mut line =
                serde_json::to_string(&response).context("failed to serialize response")?;
            line.push('\n');
            stdout
                .write_all(line.as_bytes())
                .await
                .context("failed to write response")?;
            stdout.flush().await.context("failed to flush response")?;
        }
        anyhow::Ok(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut calls = JoinSet::new();
    let mut in_flight: HashMap<String, AbortHandle> = HashMap::new();
    info!(tools = dispatcher.tool_definitions().len(), "serving over stdio");

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        while calls.try_join_next().is_some() {}
        in_flight.retain(|_, handle| !handle.is_finished());

        if line.trim().is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                debug!(error = %err, "ignoring unparsable line");
                continue;
            }
        };

        let method = request
            .get("method")
            .and_then(|value| value.as_str())
            .map(str::to_owned);
        let id = request.get("id").cloned();

        match (method.as_deref(), id) {
            (Some("initialize"), Some(id)) => {
                let _ = tx.send(response(id, initialize_result()));
            }
            (Some("ping"), Some(id)) => {
                let _ = tx.send(response(id, json!({})));
            }
            (Some("tools/list"), Some(id)) => {
                let result = json!({ "tools": dispatcher.tool_definitions() });
                let _ = tx.send(response(id, result));
            }
            (Some("tools/call"), Some(id)) => {
                let key = id.to_string();
                let dispatcher = Arc::clone(&dispatcher);
                let tx = tx.clone();
                let handle = calls.spawn(async move {
                    let result = handle_tool_call(&dispatcher, &request).await;
                    let _ = tx.send(response(id, result));
                });
                in_flight.insert(key, handle);
            }
            (Some("notifications/cancelled"), None) => {
                let request_id = request
                    .get("params")
                    .and_then(|params| params.get("requestId"))
                    .map(Value::to_string);
                if let Some(request_id) = request_id
                    && let Some(handle) = in_flight.remove(&request_id)
                {
                    handle.abort();
                    info!(request_id = %request_id, "tool call cancelled");
                }
            }
            _ => {}
        }
    }

    while calls.join_next().await.is_some() {}
    drop(tx);
    writer.await.context("response writer stopped")??;
    dispatcher.shutdown().await;
    Ok(())
}

fn response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

async fn handle_tool_call(dispatcher: &Dispatcher, request: &Value) -> Value {
    let Some(params) = request.get("params").and_then(|value| value.as_object()) else {
        return error_result(ToolError::invalid_argument("params must be an object"));
    };

    let Some(name) = params.get("name").and_then(|value| value.as_str()) else {
        return error_result(ToolError::invalid_argument(
            "params.name must be a string",
        ));
    };

    let args = params
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| json!({}));

    debug!(tool = name, "tool call");
    dispatcher.call(name, args).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn documents_server_reads_files() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "abc").expect("write");

        let dispatcher = Dispatcher::documents();
        let request = json!({
            "params": {"name": "read_file", "arguments": {"file_path": path.to_string_lossy()}}
        });
        let result = handle_tool_call(&dispatcher, &request).await;
        assert_eq!(result["isError"], json!(false));
        assert_eq!(result["structuredContent"]["content"], json!("abc"));
    }

    #[tokio::test]
    async fn documents_server_has_no_database_tools() {
        let dispatcher = Dispatcher::documents();
        let names: Vec<_> = dispatcher
            .tool_definitions()
            .iter()
            .filter_map(|tool| tool["name"].as_str().map(str::to_owned))
            .collect();
        assert_eq!(names, vec!["read_file"]);

        let result = dispatcher.call("query", json!({"sql": "SELECT 1"})).await;
        assert_eq!(result["isError"], json!(true));
        assert!(
            result["content"][0]["text"]
                .as_str()
                .is_some_and(|text| text.contains("query"))
        );
    }

    #[tokio::test]
    async fn malformed_params_are_tool_errors() {
        let dispatcher = Dispatcher::documents();
        let result = handle_tool_call(&dispatcher, &json!({"params": 3})).await;
        assert_eq!(result["isError"], json!(true));
        let result = handle_tool_call(&dispatcher, &json!({"params": {"name": 3}})).await;
        assert_eq!(result["isError"], json!(true));
    }

    #[test]
    fn initialize_reports_package() {
        let result = initialize_result();
        assert_eq!(result["protocolVersion"], json!(PROTOCOL_VERSION));
        assert_eq!(result["serverInfo"]["name"], json!(env!("CARGO_PKG_NAME")));
    }
}
