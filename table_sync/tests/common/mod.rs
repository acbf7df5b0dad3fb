//! In-memory stand-ins for the database used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Mutex;

use table_sync::{
    Error, FieldDescriptor, Result, SchemaProbe, StatementExecutor, TableDescriptor, ValueKind,
};

/// A fake database that tracks table and column names
///
/// Executed statements are recorded and applied to the tracked schema, so a
/// second run sees the effect of the first.
#[derive(Default)]
pub struct FakeDatabase {
    tables: Mutex<IndexMap<String, Vec<String>>>,
    executed: Mutex<Vec<String>>,
    probe_failure: Option<String>,
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, table: &str, columns: &[&str]) -> Self {
        self.tables.lock().unwrap().insert(
            table.to_string(),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        self
    }

    /// Make every probe fail with the given message
    pub fn failing_probes(mut self, message: &str) -> Self {
        self.probe_failure = Some(message.to_string());
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    pub fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.tables.lock().unwrap().get(table).cloned()
    }

    fn apply(&self, sql: &str) {
        let mut tables = self.tables.lock().unwrap();
        let words: Vec<&str> = sql.split_whitespace().collect();

        match words.as_slice() {
            ["DROP", "TABLE", "IF", "EXISTS", name, ..] => {
                tables.shift_remove(name.trim_end_matches(';'));
            }
            ["CREATE", "TABLE", "IF", "NOT", "EXISTS", ..] => {
                let (head, body) = sql.split_once("(\n\t").unwrap();
                let name = head.rsplit(' ').next().unwrap().to_string();
                let columns = body
                    .split(",\n\t")
                    .map(|clause| clause.split_whitespace().next().unwrap_or_default())
                    .filter(|first| !matches!(*first, "INDEX" | "UNIQUE" | "PRIMARY"))
                    .map(str::to_string)
                    .collect();
                tables.entry(name).or_insert(columns);
            }
            ["ALTER", "TABLE", name, "ADD", "COLUMN", column, ..] => {
                if let Some(columns) = tables.get_mut(*name) {
                    columns.push(column.to_string());
                }
            }
            _ => {}
        }
    }
}

#[async_trait]
impl SchemaProbe for FakeDatabase {
    async fn table_exists(&self, table: &str) -> Result<bool> {
        if let Some(message) = &self.probe_failure {
            return Err(Error::ProbeError {
                object: table.to_string(),
                message: message.clone(),
            });
        }
        Ok(self.tables.lock().unwrap().contains_key(table))
    }

    async fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        if let Some(message) = &self.probe_failure {
            return Err(Error::ProbeError {
                object: format!("{}.{}", table, column),
                message: message.clone(),
            });
        }
        Ok(self
            .tables
            .lock()
            .unwrap()
            .get(table)
            .is_some_and(|columns| columns.iter().any(|c| c == column)))
    }
}

#[async_trait]
impl StatementExecutor for FakeDatabase {
    async fn execute(&self, sql: &str) -> Result<()> {
        self.executed.lock().unwrap().push(sql.to_string());
        self.apply(sql);
        Ok(())
    }
}

/// The `user1` table used across the sync tests
pub fn user1() -> TableDescriptor {
    TableDescriptor::new("app::entity::User1", "user1")
        .field(FieldDescriptor::new("id", ValueKind::Int64).primary_key(false))
        .field(
            FieldDescriptor::new("username", ValueKind::String)
                .nullable(false)
                .default_str("hello world"),
        )
        .field(FieldDescriptor::new("sex", ValueKind::Int32))
}

pub const USER1_CREATE: &str = "CREATE TABLE IF NOT EXISTS user1(\n\
                                \tid BIGINT NOT NULL,\n\
                                \tusername VARCHAR(255) NOT NULL DEFAULT \"hello world\" COMMENT \"\",\n\
                                \tsex INTEGER COMMENT \"\",\n\
                                \tPRIMARY KEY (id)\n\
                                );";
