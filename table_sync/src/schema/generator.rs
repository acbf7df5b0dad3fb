//! DDL generator
//!
//! This module renders MySQL DDL for table descriptors: whole CREATE TABLE
//! statements for fresh tables and ALTER TABLE statements for columns that
//! are missing from an existing one.

use crate::error::{Error, Result};
use crate::schema::mapper;
use crate::schema::types::{ColumnType, CompositeIndexSpec, FieldDescriptor, TableDescriptor};
use crate::utils::naming::{column_name_for_member, composite_index_name, quote_literal};

/// DDL statement generator
#[derive(Debug, Clone, Copy, Default)]
pub struct DdlGenerator {
    uppercase: bool,
}

impl DdlGenerator {
    /// Create a new generator; `uppercase` applies to derived column names
    pub fn new(uppercase: bool) -> Self {
        Self { uppercase }
    }

    /// Resolve the column name of a field
    pub fn column_name(&self, field: &FieldDescriptor) -> String {
        match &field.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => column_name_for_member(&field.member, self.uppercase),
        }
    }

    /// Render one column definition
    pub fn render_column(&self, field: &FieldDescriptor) -> String {
        let ty = mapper::resolve(field);
        let mut sql = format!("{} {}", self.column_name(field), self.render_type(field, ty));

        if !field.nullable {
            sql.push_str(" NOT NULL");
        }

        if Self::needs_default(field, ty) {
            let value = match field.string_default() {
                Some(value) => value.to_string(),
                None => field.default_value.to_string(),
            };
            sql.push_str(&format!(" DEFAULT {}", quote_literal(&value)));
        }

        sql.push_str(&format!(" COMMENT {}", quote_literal(&field.comment)));
        sql
    }

    /// Whether a column gets a DEFAULT clause
    ///
    /// Non-nullable character columns always get one so that existing rows can
    /// be filled; numeric columns only when a string default is given.
    pub fn needs_default(field: &FieldDescriptor, ty: ColumnType) -> bool {
        !field.nullable && (ty.is_char() || field.string_default().is_some())
    }

    /// Render the primary key column; always NOT NULL, never defaulted
    fn render_primary_key_column(&self, field: &FieldDescriptor, auto_increment: bool) -> String {
        let ty = mapper::resolve(field);
        let mut sql = format!(
            "{} {} NOT NULL",
            self.column_name(field),
            self.render_type(field, ty)
        );
        if auto_increment {
            sql.push_str(" AUTO_INCREMENT");
        }
        sql
    }

    fn render_type(&self, field: &FieldDescriptor, ty: ColumnType) -> String {
        let mut sql = mapper::render_type(ty, field.length, field.decimal_length);
        if ty.is_integer() && field.unsigned {
            sql.push_str(" UNSIGNED");
        }
        sql
    }

    /// Render a field's inline index, if it declares one
    pub fn render_inline_index(&self, field: &FieldDescriptor) -> Option<String> {
        let index = field.index.as_ref()?;
        let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };

        Some(match index.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => format!("{} {} ({})", kind, name, self.column_name(field)),
            None => format!("{} ({})", kind, self.column_name(field)),
        })
    }

    /// Resolve the column list of a composite index
    pub fn resolve_index_columns(
        &self,
        table: &TableDescriptor,
        index: &CompositeIndexSpec,
    ) -> Result<Vec<String>> {
        if !index.columns.is_empty() {
            return Ok(index.columns.clone());
        }
        if !index.fields.is_empty() {
            return Ok(index
                .fields
                .iter()
                .map(|member| column_name_for_member(member, self.uppercase))
                .collect());
        }

        Err(Error::ConfigError(format!(
            "Composite index on table `{}` ({}) names no columns",
            table.table_name, table.owner
        )))
    }

    /// Render all composite indices of a table as one comma-joined fragment
    pub fn render_composite_indices(&self, table: &TableDescriptor) -> Result<Option<String>> {
        if table.indices.is_empty() {
            return Ok(None);
        }

        let mut fragments = Vec::with_capacity(table.indices.len());
        for index in &table.indices {
            let columns = self.resolve_index_columns(table, index)?;
            let name = match index.name.as_deref().filter(|n| !n.is_empty()) {
                Some(name) => name.to_string(),
                None => composite_index_name(&columns),
            };
            let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };

            fragments.push(format!("{} {} ({})", kind, name, columns.join(",")));
        }

        Ok(Some(fragments.join(",\n\t")))
    }

    /// Validate and return the trimmed table name
    pub fn table_name<'t>(&self, table: &'t TableDescriptor) -> Result<&'t str> {
        let name = table.table_name.trim();
        if name.is_empty() {
            return Err(Error::ConfigError(format!(
                "{} has no table name or an invalid one: `{}`",
                table.owner, table.table_name
            )));
        }
        Ok(name)
    }

    /// Check the rules every descriptor must satisfy, whatever the mode
    ///
    /// The table name must be non-blank, at most one field may be the primary
    /// key, and every composite index must name at least one column.
    pub fn validate(&self, table: &TableDescriptor) -> Result<()> {
        let table_name = self.table_name(table)?;

        if table.primary_key_fields().count() > 1 {
            return Err(Error::ConfigError(format!(
                "{} declares more than one primary key on table `{}`",
                table.owner, table_name
            )));
        }

        for index in &table.indices {
            self.resolve_index_columns(table, index)?;
        }
        Ok(())
    }

    /// Generate the CREATE TABLE statement for a table
    pub fn render_create_table(&self, table: &TableDescriptor) -> Result<String> {
        self.validate(table)?;
        let table_name = self.table_name(table)?;

        let mut clauses = Vec::with_capacity(table.fields.len() + 2);
        let mut primary_key = None;

        for field in &table.fields {
            if let Some(pk) = &field.primary_key {
                clauses.push(self.render_primary_key_column(field, pk.auto_increment));
                primary_key = Some(self.column_name(field));
            } else {
                clauses.push(self.render_column(field));
                if let Some(index) = self.render_inline_index(field) {
                    clauses.push(index);
                }
            }
        }

        if let Some(column) = primary_key {
            clauses.push(format!("PRIMARY KEY ({})", column));
        }

        if let Some(indices) = self.render_composite_indices(table)? {
            clauses.push(indices);
        }

        let mut sql = format!("CREATE TABLE IF NOT EXISTS {}(\n\t", table_name);
        sql.push_str(&clauses.join(",\n\t"));
        sql.push_str("\n)");

        if !table.comment.is_empty() {
            sql.push_str(&format!(" COMMENT {}", quote_literal(&table.comment)));
        }
        if let Some(charset) = table.charset.as_deref().filter(|c| !c.is_empty()) {
            sql.push_str(&format!(" DEFAULT CHARSET = {}", charset));
        }
        sql.push(';');

        Ok(sql)
    }

    /// Generate SQL to drop a table
    pub fn render_drop_table(&self, table_name: &str) -> String {
        format!("DROP TABLE IF EXISTS {};", table_name)
    }

    /// Generate SQL to add one column to an existing table
    pub fn render_add_column(&self, table_name: &str, field: &FieldDescriptor) -> String {
        format!("ALTER TABLE {} ADD COLUMN {}", table_name, self.render_column(field))
    }

    /// Generate SQL to add a field's inline index to an existing table
    pub fn render_add_index(&self, table_name: &str, field: &FieldDescriptor) -> Option<String> {
        self.render_inline_index(field)
            .map(|index| format!("ALTER TABLE {} ADD {}", table_name, index))
    }
}
