//! Live schema probing
//!
//! This module answers whether a table, or a column within a table, exists in
//! the connected database.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::mysql::MySqlDatabaseError;

use crate::db::connection::DatabaseConnection;
use crate::error::{Error, Result};

/// MySQL error number for ER_NO_SUCH_TABLE
pub const ER_NO_SUCH_TABLE: u16 = 1146;

const SQLSTATE_NO_SUCH_TABLE: &str = "42S02";

static MISSING_TABLE_MESSAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Table '.*' doesn't exist").expect("static regex is valid"));

/// Existence checks against the live schema
#[async_trait]
pub trait SchemaProbe: Send + Sync {
    /// Whether the named table exists
    async fn table_exists(&self, table: &str) -> Result<bool>;

    /// Whether the named column exists within the named table
    async fn column_exists(&self, table: &str, column: &str) -> Result<bool>;
}

/// Whether a database error means the probed table is missing
///
/// The server error number decides when present, then the SQLSTATE. The
/// message is only consulted when the driver reported neither.
pub fn is_missing_table_error(number: Option<u16>, code: Option<&str>, message: &str) -> bool {
    match (number, code) {
        (Some(number), _) => number == ER_NO_SUCH_TABLE,
        (None, Some(code)) => code == SQLSTATE_NO_SUCH_TABLE,
        (None, None) => MISSING_TABLE_MESSAGE.is_match(message),
    }
}

fn is_missing_object(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(db_error) => {
            let number = db_error
                .try_downcast_ref::<MySqlDatabaseError>()
                .map(|e| e.number());
            let code = db_error.code();
            is_missing_table_error(number, code.as_deref(), db_error.message())
        }
        _ => false,
    }
}

/// Probe backed by `DESC` statements on a MySQL connection
pub struct MySqlProbe<'a> {
    connection: &'a DatabaseConnection,
}

impl<'a> MySqlProbe<'a> {
    /// Create a new probe over a connection
    pub fn new(connection: &'a DatabaseConnection) -> Self {
        Self { connection }
    }

    async fn has_rows(&self, sql: &str, object: &str) -> Result<bool> {
        match self.connection.describe(sql).await {
            Ok(rows) => Ok(rows > 0),
            Err(e) if is_missing_object(&e) => {
                tracing::debug!(object = object, "Object not found");
                Ok(false)
            }
            Err(e) => Err(Error::ProbeError {
                object: object.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

#[async_trait]
impl<'a> SchemaProbe for MySqlProbe<'a> {
    async fn table_exists(&self, table: &str) -> Result<bool> {
        tracing::debug!(table = table, "Checking whether table exists");
        self.has_rows(&format!("DESC {}", table), table).await
    }

    async fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        tracing::debug!(table = table, column = column, "Checking whether column exists");
        let object = format!("{}.{}", table, column);
        self.has_rows(&format!("DESCRIBE {} {}", table, column), &object)
            .await
    }
}
