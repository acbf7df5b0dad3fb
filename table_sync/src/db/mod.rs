//! Database module for TableSync
//!
//! This module handles the connection and statement execution.

pub mod connection;
pub mod executor;

// Re-export key types
pub use connection::DatabaseConnection;
pub use executor::{SqlExecutor, StatementExecutor};
