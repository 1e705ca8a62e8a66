use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value, json};
use std::process;

mod config;
mod db;
mod extract;
mod input;
mod logging;
mod mcp;
mod server;
mod tools;

use config::{DatabaseArgs, DatabaseConfig};
use db::Database;
use server::Dispatcher;

#[derive(Parser)]
#[command(name = "mcp-doris-docs")]
#[command(
    version,
    about = "MCP tools for reading local documents and querying Apache Doris"
)]
struct Cli {
    /// Emit logs as JSON on stderr
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum ServeTarget {
    /// Serve the read_file tool
    Documents {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
    },
    /// Serve the query, list_tables and describe_table tools
    Database {
        /// Serve MCP over stdio (NDJSON)
        #[arg(long)]
        stdio: bool,
        #[command(flatten)]
        db: DatabaseArgs,
    },
}

#[derive(Args, Clone)]
struct ReadFileArgs {
    /// Path to the document (.txt, .md, .pdf, .docx)
    #[arg(long)]
    path: String,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
}

#[derive(Args, Clone)]
struct QueryArgs {
    /// SQL statement to run
    #[arg(long)]
    sql: String,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    db: DatabaseArgs,
}

#[derive(Args, Clone)]
struct ListTablesArgs {
    /// Database to list instead of the connection default
    #[arg(long)]
    from: Option<String>,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    db: DatabaseArgs,
}

#[derive(Args, Clone)]
struct DescribeTableArgs {
    /// Table to describe
    #[arg(long)]
    table: String,
    /// Database holding the table instead of the connection default
    #[arg(long)]
    from: Option<String>,
    /// Output JSON structuredContent
    #[arg(long)]
    json: bool,
    #[command(flatten)]
    db: DatabaseArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an MCP server
    Serve {
        #[command(subcommand)]
        target: ServeTarget,
    },
    /// Extract text from a local document
    ReadFile(ReadFileArgs),
    /// Run a SQL statement
    Query(QueryArgs),
    /// List tables of a database
    ListTables(ListTablesArgs),
    /// Show the columns of a table
    DescribeTable(DescribeTableArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    match cli.command {
        Commands::Serve { target } => serve(target).await,
        Commands::ReadFile(args) => {
            let result = tools::read_file::call(&json!({ "file_path": args.path }));
            print_tool_result(result, args.json)
        }
        Commands::Query(args) => {
            let database = connect(args.db).await?;
            let result = tools::query::call(&database, &json!({ "sql": args.sql })).await;
            database.close().await;
            print_tool_result(result, args.json)
        }
        Commands::ListTables(args) => {
            let mut map = Map::new();
            if let Some(from) = args.from {
                map.insert("database".to_string(), json!(from));
            }
            let database = connect(args.db).await?;
            let result = tools::list_tables::call(&database, &Value::Object(map)).await;
            database.close().await;
            print_tool_result(result, args.json)
        }
        Commands::DescribeTable(args) => {
            let mut map = Map::new();
            map.insert("table".to_string(), json!(args.table));
            if let Some(from) = args.from {
                map.insert("database".to_string(), json!(from));
            }
            let database = connect(args.db).await?;
            let result = tools::describe_table::call(&database, &Value::Object(map)).await;
            database.close().await;
            print_tool_result(result, args.json)
        }
    }
}

async fn serve(target: ServeTarget) -> Result<()> {
    match target {
        ServeTarget::Documents { stdio } => {
            require_stdio(stdio)?;
            server::run_stdio(Dispatcher::documents()).await
        }
        ServeTarget::Database { stdio, db } => {
            require_stdio(stdio)?;
            let database = connect(db).await?;
            server::run_stdio(Dispatcher::database(database)).await
        }
    }
}

fn require_stdio(stdio: bool) -> Result<()> {
    if !stdio {
        anyhow::bail!("only --stdio transport is supported");
    }
    Ok(())
}

async fn connect(args: DatabaseArgs) -> Result<Database> {
    let config = DatabaseConfig::try_from(args)?;
    Database::connect(&config)
        .await
        .context("failed to initialize database connection")
}

fn print_tool_result(result: Value, json_output: bool) -> Result<()> {
    let is_error = result
        .get("isError")
        .and_then(|value| value.as_bool())
        .unwrap_or(false);

    let text = result
        .get("content")
        .and_then(|value| value.as_array())
        .and_then(|arr| arr.first())
        .and_then(|value| value.get("text"))
        .and_then(|value| value.as_str())
        .unwrap_or("");

    if is_error {
        eprintln!("{text}");
        process::exit(1);
    }

    if json_output {
        let structured = result
            .get("structuredContent")
            .cloned()
            .unwrap_or_else(|| json!({}));
        let output = serde_json::to_string_pretty(&structured)?;
        println!("{output}");
        return Ok(());
    }

    println!("{text}");
    Ok(())
}
