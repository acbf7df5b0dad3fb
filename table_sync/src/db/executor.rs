//! SQL executor
//!
//! This module runs an accumulated statement list in order.

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Something that can execute a single SQL statement
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<()>;
}

/// SQL executor for running statement lists
pub struct SqlExecutor<'a, E: StatementExecutor + ?Sized> {
    target: &'a E,
    show_sql: bool,
}

impl<'a, E: StatementExecutor + ?Sized> SqlExecutor<'a, E> {
    /// Create a new SQL executor
    pub fn new(target: &'a E, show_sql: bool) -> Self {
        Self { target, show_sql }
    }

    /// Execute statements in order, stopping at the first failure
    ///
    /// Statements are not wrapped in a transaction, so anything executed
    /// before a failure stays applied. Returns the number executed.
    pub async fn execute_all(&self, statements: &[String]) -> Result<usize> {
        for (i, statement) in statements.iter().enumerate() {
            if self.show_sql {
                tracing::info!(statement_number = i + 1, sql = %statement, "Executing statement");
            }

            self.target
                .execute(statement)
                .await
                .map_err(|e| Error::ExecutionError {
                    statement: statement.clone(),
                    message: e.to_string(),
                })?;
        }

        Ok(statements.len())
    }
}
