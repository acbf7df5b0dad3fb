//! Database connection handling
//!
//! A run holds exactly one MySQL connection, opened at the start and closed
//! at the end.

use async_trait::async_trait;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::Executor;
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::db::executor::StatementExecutor;
use crate::error::{Error, Result};

/// Single-connection handle to the target database
#[derive(Debug, Clone)]
pub struct DatabaseConnection {
    pool: MySqlPool,
}

impl DatabaseConnection {
    /// Open a connection from configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let timeout_seconds = config.connect_timeout_seconds.unwrap_or(30);

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| Error::DatabaseError(format!("Failed to connect: {}", e)))?;

        tracing::debug!("Database connection opened");
        Ok(Self { pool })
    }

    /// Execute a SQL statement over the text protocol
    pub async fn execute(&self, sql: &str) -> Result<()> {
        (&self.pool).execute(sql).await?;
        Ok(())
    }

    /// Run an introspection statement and return how many rows it produced
    ///
    /// The raw `sqlx::Error` is returned so callers can classify it.
    pub async fn describe(&self, sql: &str) -> std::result::Result<usize, sqlx::Error> {
        let rows = (&self.pool).fetch_all(sql).await?;
        Ok(rows.len())
    }

    /// Close the connection
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Database connection closed");
    }
}

#[async_trait]
impl StatementExecutor for DatabaseConnection {
    async fn execute(&self, sql: &str) -> Result<()> {
        DatabaseConnection::execute(self, sql).await
    }
}
