//! Accumulated schema changes
//!
//! Statements are collected into two ordered lists: immediate statements
//! (drops and creates) and deferred statements (alters). Every immediate
//! statement runs before any deferred one.

use serde::Serialize;

/// Outcome of planning one table descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableState {
    /// The descriptor opted out of checking
    Skipped,
    /// The descriptor had a blank table name
    NoName,
    /// Dropped and recreated
    CreateFresh,
    /// Created because it did not exist
    CreateMissing,
    /// Existing table, missing columns added
    UpdateExisting { added_columns: usize },
    /// Planning failed and the table was left out of the run
    Failed { reason: String },
}

/// Planned outcome for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablePlan {
    /// Table name, or the owning record type when the name is blank
    pub table: String,
    pub state: TableState,
}

/// Statements needed to bring the database in line with the descriptors
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaDiff {
    pub immediate: Vec<String>,
    pub deferred: Vec<String>,
    pub tables: Vec<TablePlan>,
}

impl SchemaDiff {
    /// Create an empty diff
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a drop or create statement
    pub fn push_immediate(&mut self, sql: String) {
        self.immediate.push(sql);
    }

    /// Queue an alter statement
    pub fn push_deferred(&mut self, sql: String) {
        self.deferred.push(sql);
    }

    /// Record how a table was planned
    pub fn record(&mut self, table: &str, state: TableState) {
        self.tables.push(TablePlan {
            table: table.to_string(),
            state,
        });
    }

    /// Append another diff, keeping each list's order
    pub fn merge(&mut self, other: SchemaDiff) {
        self.immediate.extend(other.immediate);
        self.deferred.extend(other.deferred);
        self.tables.extend(other.tables);
    }

    /// All statements in execution order
    pub fn statements(&self) -> Vec<String> {
        self.immediate
            .iter()
            .chain(self.deferred.iter())
            .cloned()
            .collect()
    }

    /// Check if the diff is empty (no statements to run)
    pub fn is_empty(&self) -> bool {
        self.immediate.is_empty() && self.deferred.is_empty()
    }

    /// Number of planned statements
    pub fn len(&self) -> usize {
        self.immediate.len() + self.deferred.len()
    }
}
