//! Connection settings for the database tools.

use clap::Args;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "Doris password must be provided via --password flag or DORIS_PASSWORD environment variable"
    )]
    MissingPassword,
    #[error(
        "Doris database must be provided via --database flag or DORIS_DATABASE environment variable"
    )]
    MissingDatabase,
    #[error("--max-open-conns must be at least 1")]
    InvalidPoolSize,
    #[error("--acquire-timeout-secs must be at least 1")]
    InvalidAcquireTimeout,
}

#[derive(Args, Clone, Debug)]
pub struct DatabaseArgs {
    /// Doris server host
    #[arg(long, default_value = "localhost")]
    pub host: String,
    /// Doris server port (MySQL protocol)
    #[arg(long, default_value_t = 9030)]
    pub port: u16,
    /// Doris username
    #[arg(long, default_value = "root")]
    pub user: String,
    /// Doris password
    #[arg(long, env = "DORIS_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,
    /// Default database name
    #[arg(long, env = "DORIS_DATABASE", default_value = "")]
    pub database: String,
    /// Maximum number of open connections
    #[arg(long, default_value_t = 10)]
    pub max_open_conns: u32,
    /// Seconds an idle connection is kept before it is closed
    #[arg(long, default_value_t = 600)]
    pub idle_timeout_secs: u64,
    /// Seconds after which a connection is retired and replaced
    #[arg(long, default_value_t = 3600)]
    pub conn_max_lifetime_secs: u64,
    /// Seconds to wait for a free connection
    #[arg(long, default_value_t = 30)]
    pub acquire_timeout_secs: u64,
    /// Deadline for a single statement; unlimited when unset
    #[arg(long)]
    pub query_timeout_secs: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub acquire_timeout_secs: u64,
    pub query_timeout_secs: Option<u64>,
}

impl DatabaseConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.password.is_empty() {
            return Err(ConfigError::MissingPassword);
        }
        if self.database.is_empty() {
            return Err(ConfigError::MissingDatabase);
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }
        if self.acquire_timeout_secs == 0 {
            return Err(ConfigError::InvalidAcquireTimeout);
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9030,
            user: "root".to_string(),
            password: String::new(),
            database: String::new(),
            max_connections: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 3600,
            acquire_timeout_secs: 30,
            query_timeout_secs: None,
        }
    }
}

impl TryFrom<DatabaseArgs> for DatabaseConfig {
    type Error = ConfigError;

    fn try_from(args: DatabaseArgs) -> Result<Self, Self::Error> {
        let config = Self {
            host: args.host,
            port: args.port,
            user: args.user,
            password: args.password,
            database: args.database,
            max_connections: args.max_open_conns,
            idle_timeout_secs: args.idle_timeout_secs,
            max_lifetime_secs: args.conn_max_lifetime_secs,
            acquire_timeout_secs: args.acquire_timeout_secs,
            query_timeout_secs: args.query_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }
}
