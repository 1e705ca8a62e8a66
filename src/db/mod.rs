//! Read-only access to a MySQL-protocol database (Apache Doris) through a
//! shared connection pool.

use crate::config::DatabaseConfig;
use crate::mcp::errors::ToolError;
use futures::{Stream, TryStreamExt};
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::{Column, Either, Executor, MySql, Row, Statement, TypeInfo};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub mod results;
pub mod value;

use results::{QueryResult, RowSet, TableList, TableSchema};
use value::{NormalizedValue, decode_cell, normalize};

/// Cheap to clone; every clone shares the same pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: MySqlPool,
    query_timeout: Option<Duration>,
}

impl Database {
    /// Creates the pool and opens one connection so that bad credentials or
    /// an unreachable server surface at startup.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = pool_options(config)
            .connect_with(connect_options(config))
            .await?;
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            max_connections = config.max_connections,
            "database pool ready"
        );
        Ok(Self {
            pool,
            query_timeout: config.query_timeout(),
        })
    }

    /// Creates the pool without opening any connection.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        Self {
            pool: pool_options(config).connect_lazy_with(connect_options(config)),
            query_timeout: config.query_timeout(),
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }

    /// Runs `sql` verbatim. Elapsed time covers everything from entry to the
    /// last row read.
    pub async fn query(&self, sql: &str) -> Result<QueryResult, ToolError> {
        let started = Instant::now();
        let set = self
            .fetch(sql, &format!("Query failed for `{sql}`"), true)
            .await?;
        Ok(QueryResult::new(set, started.elapsed()))
    }

    pub async fn list_tables(&self, database: Option<&str>) -> Result<TableList, ToolError> {
        let (sql, context) = match database {
            Some(database) => (
                format!("SHOW TABLES FROM {}", quote_identifier(database)),
                format!("Failed to list tables in `{database}`"),
            ),
            None => ("SHOW TABLES".to_string(), "Failed to list tables".to_string()),
        };
        let set = self.fetch(&sql, &context, false).await?;
        TableList::from_rows(set, &context)
    }

    pub async fn describe_table(
        &self,
        table: &str,
        database: Option<&str>,
    ) -> Result<TableSchema, ToolError> {
        let sql = match database {
            Some(database) => format!(
                "DESCRIBE {}.{}",
                quote_identifier(database),
                quote_identifier(table)
            ),
            None => format!("DESCRIBE {}", quote_identifier(table)),
        };
        let context = format!("Failed to describe table `{table}`");
        let set = self.fetch(&sql, &context, false).await?;
        TableSchema::from_rows(table, set, &context)
    }

    async fn fetch(
        &self,
        sql: &str,
        context: &str,
        resolve_empty_columns: bool,
    ) -> Result<RowSet, ToolError> {
        let run = self.fetch_rows(sql, context, resolve_empty_columns);
        match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, run).await.map_err(|_| {
                ToolError::query_failure(context, format!("deadline of {limit:?} exceeded"))
            })?,
            None => run.await,
        }
    }

    async fn fetch_rows(
        &self,
        sql: &str,
        context: &str,
        resolve_empty_columns: bool,
    ) -> Result<RowSet, ToolError> {
        let mut checkout = Checkout::new(
            self.pool
                .acquire()
                .await
                .map_err(|err| classify(err, context))?,
        );

        let mut columns = None;
        let mut rows = Vec::new();
        let stream = checkout.connection().fetch_many(sqlx::raw_sql(sql));
        single_result_set(stream, context, |row: MySqlRow| {
            if columns.is_none() {
                columns = Some(column_names(&row));
            }
            rows.push(normalize_row(&row, context)?);
            Ok(())
        })
        .await?;

        let columns = match columns {
            Some(columns) => columns,
            None if resolve_empty_columns => statement_columns(checkout.connection(), sql).await,
            None => Vec::new(),
        };
        checkout.release();
        debug!(rows = rows.len(), columns = columns.len(), "statement finished");
        Ok(RowSet { columns, rows })
    }
}

/// A pooled connection that goes back to the pool only after [`release`].
/// Dropped earlier, it is closed so the socket is shut instead of drained.
///
/// [`release`]: Checkout::release
struct Checkout {
    conn: PoolConnection<MySql>,
    completed: bool,
}

impl Checkout {
    fn new(conn: PoolConnection<MySql>) -> Self {
        Self {
            conn,
            completed: false,
        }
    }

    fn connection(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }

    fn release(mut self) {
        self.completed = true;
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        if !self.completed {
            debug!("closing interrupted connection");
            self.conn.close_on_drop();
        }
    }
}

/// Feeds the rows of the only result set to `on_row`. Any output after the
/// first result set has ended means `sql` held more than one statement.
async fn single_result_set<D, R, S>(
    mut stream: S,
    context: &str,
    mut on_row: impl FnMut(R) -> Result<(), ToolError>,
) -> Result<(), ToolError>
where
    S: Stream<Item = Result<Either<D, R>, sqlx::Error>> + Unpin,
{
    let mut ended = false;
    while let Some(item) = stream
        .try_next()
        .await
        .map_err(|err| classify(err, context))?
    {
        if ended {
            return Err(ToolError::query_failure(
                context,
                "multiple statements are not supported",
            ));
        }
        match item {
            Either::Left(_) => ended = true,
            Either::Right(row) => on_row(row)?,
        }
    }
    Ok(())
}

fn pool_options(config: &DatabaseConfig) -> MySqlPoolOptions {
    MySqlPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(0)
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .acquire_timeout(config.acquire_timeout())
}

fn connect_options(config: &DatabaseConfig) -> MySqlConnectOptions {
    MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database)
        .charset("utf8mb4")
}

/// Column names of a statement that produced no rows, via preparation.
/// Returns an empty list when the statement cannot be prepared.
async fn statement_columns(conn: &mut MySqlConnection, sql: &str) -> Vec<String> {
    match conn.prepare(sql).await {
        Ok(statement) => statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect(),
        Err(err) => {
            debug!(error = %err, "could not resolve columns of empty result");
            Vec::new()
        }
    }
}

fn column_names(row: &MySqlRow) -> Vec<String> {
    row.columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect()
}

fn normalize_row(row: &MySqlRow, context: &str) -> Result<Vec<NormalizedValue>, ToolError> {
    row.columns()
        .iter()
        .map(|column| {
            let scan_failure =
                |reason: String| ToolError::scan_failure(context, column.name(), reason);
            let bytes: Option<&[u8]> = row
                .try_get_unchecked(column.ordinal())
                .map_err(|err| scan_failure(err.to_string()))?;
            let native = decode_cell(column.type_info().name(), bytes).map_err(scan_failure)?;
            Ok(normalize(native))
        })
        .collect()
}

fn classify(err: sqlx::Error, context: &str) -> ToolError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::WorkerCrashed => ToolError::connection_unavailable(context, err),
        other => ToolError::query_failure(context, other),
    }
}

pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::errors;

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            password: "secret".to_string(),
            database: "test".to_string(),
            acquire_timeout_secs: 1,
            ..Default::default()
        }
    }

    #[test]
    fn identifiers_are_backtick_quoted() {
        assert_eq!(quote_identifier("orders"), "`orders`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }

    #[test]
    fn pool_errors_are_connection_unavailable() {
        let err = classify(sqlx::Error::PoolClosed, "Query failed for `SELECT 1`");
        assert_eq!(err.kind(), errors::CONNECTION_UNAVAILABLE);
        assert!(err.to_string().contains("SELECT 1"));
        let err = classify(sqlx::Error::PoolTimedOut, "Failed to list tables");
        assert_eq!(err.kind(), errors::CONNECTION_UNAVAILABLE);
    }

    #[test]
    fn other_errors_are_query_failures() {
        let err = classify(sqlx::Error::RowNotFound, "Failed to describe table `t`");
        assert_eq!(err.kind(), errors::QUERY_FAILED);
        assert!(err.to_string().starts_with("Failed to describe table `t`"));
    }

    type Item = Result<Either<(), i64>, sqlx::Error>;

    async fn collect(items: Vec<Item>) -> Result<Vec<i64>, ToolError> {
        let mut rows = Vec::new();
        single_result_set(
            futures::stream::iter(items),
            "Query failed for `SELECT 1; SELECT 2`",
            |row| {
                rows.push(row);
                Ok(())
            },
        )
        .await?;
        Ok(rows)
    }

    #[tokio::test]
    async fn one_result_set_yields_its_rows() {
        let rows = collect(vec![
            Ok(Either::Right(1)),
            Ok(Either::Right(2)),
            Ok(Either::Left(())),
        ])
        .await
        .expect("rows");
        assert_eq!(rows, vec![1, 2]);
    }

    #[tokio::test]
    async fn statement_without_rows_is_fine() {
        let rows = collect(vec![Ok(Either::Left(()))]).await.expect("rows");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn second_result_set_is_rejected() {
        let err = collect(vec![
            Ok(Either::Right(1)),
            Ok(Either::Left(())),
            Ok(Either::Right(2)),
            Ok(Either::Left(())),
        ])
        .await
        .expect_err("error");
        assert_eq!(err.kind(), errors::QUERY_FAILED);
        assert!(err.to_string().contains("multiple statements"));
        assert!(err.to_string().contains("SELECT 1; SELECT 2"));

        let err = collect(vec![Ok(Either::Left(())), Ok(Either::Left(()))])
            .await
            .expect_err("error");
        assert!(err.to_string().contains("multiple statements"));
    }

    #[tokio::test]
    async fn stream_errors_are_classified() {
        let err = collect(vec![Ok(Either::Right(1)), Err(sqlx::Error::PoolClosed)])
            .await
            .expect_err("error");
        assert_eq!(err.kind(), errors::CONNECTION_UNAVAILABLE);
    }

    #[tokio::test]
    async fn closed_pool_is_connection_unavailable() {
        let database = Database::connect_lazy(&unreachable_config());
        database.close().await;
        let err = database.query("SELECT 1").await.expect_err("error");
        assert_eq!(err.kind(), errors::CONNECTION_UNAVAILABLE);
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_unavailable() {
        let database = Database::connect_lazy(&unreachable_config());
        let err = database.list_tables(None).await.expect_err("error");
        assert_eq!(err.kind(), errors::CONNECTION_UNAVAILABLE);
    }
}
