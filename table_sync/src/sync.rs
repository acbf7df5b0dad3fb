//! Schema synchronization
//!
//! Walks the table descriptors, decides per table whether to skip, recreate,
//! create or extend it, and accumulates the resulting statements.

use crate::config::{SyncConfig, SyncMode, TableErrorPolicy};
use crate::error::Result;
use crate::schema::analyzer::SchemaProbe;
use crate::schema::diff::{SchemaDiff, TableState};
use crate::schema::generator::DdlGenerator;
use crate::schema::types::TableDescriptor;

/// Plans the statements for one synchronization run
pub struct Synchronizer<'a> {
    config: &'a SyncConfig,
    generator: DdlGenerator,
}

impl<'a> Synchronizer<'a> {
    /// Create a new synchronizer
    pub fn new(config: &'a SyncConfig) -> Self {
        Self {
            config,
            generator: DdlGenerator::new(config.uppercase),
        }
    }

    /// Plan every descriptor, probing the live schema as needed
    ///
    /// Each table is planned on its own and merged only when it succeeds.
    /// Probe errors always abort; configuration errors abort or skip the
    /// table depending on the configured policy.
    pub async fn plan<P>(&self, descriptors: &[TableDescriptor], probe: &P) -> Result<SchemaDiff>
    where
        P: SchemaProbe + ?Sized,
    {
        let mut diff = SchemaDiff::new();

        if self.config.mode == SyncMode::None {
            tracing::info!("Sync mode is none; nothing to plan");
            return Ok(diff);
        }

        for descriptor in descriptors {
            match self.plan_table(descriptor, probe).await {
                Ok(table_diff) => diff.merge(table_diff),
                Err(e)
                    if e.is_table_scoped()
                        && self.config.on_table_error == TableErrorPolicy::Skip =>
                {
                    tracing::warn!(owner = %descriptor.owner, error = %e, "Skipping table");
                    let state = if descriptor.table_name.trim().is_empty() {
                        TableState::NoName
                    } else {
                        TableState::Failed {
                            reason: e.to_string(),
                        }
                    };
                    diff.record(table_label(descriptor), state);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            immediate = diff.immediate.len(),
            deferred = diff.deferred.len(),
            "Planned schema changes"
        );
        Ok(diff)
    }

    async fn plan_table<P>(&self, descriptor: &TableDescriptor, probe: &P) -> Result<SchemaDiff>
    where
        P: SchemaProbe + ?Sized,
    {
        let mut diff = SchemaDiff::new();

        if !descriptor.check {
            tracing::debug!(owner = %descriptor.owner, "Table check disabled");
            diff.record(table_label(descriptor), TableState::Skipped);
            return Ok(diff);
        }

        self.generator.validate(descriptor)?;
        let table_name = self.generator.table_name(descriptor)?;

        match self.config.mode {
            SyncMode::None => diff.record(table_name, TableState::Skipped),
            SyncMode::Create => {
                let create = self.generator.render_create_table(descriptor)?;
                diff.push_immediate(self.generator.render_drop_table(table_name));
                diff.push_immediate(create);
                diff.record(table_name, TableState::CreateFresh);
                tracing::debug!(table = table_name, "Recreating table");
            }
            SyncMode::Update => {
                if probe.table_exists(table_name).await? {
                    let added_columns = self
                        .plan_missing_columns(descriptor, table_name, probe, &mut diff)
                        .await?;
                    diff.record(table_name, TableState::UpdateExisting { added_columns });
                    tracing::debug!(table = table_name, added_columns, "Updating table");
                } else {
                    diff.push_immediate(self.generator.render_create_table(descriptor)?);
                    diff.record(table_name, TableState::CreateMissing);
                    tracing::debug!(table = table_name, "Creating missing table");
                }
            }
        }

        Ok(diff)
    }

    /// Queue ALTER statements for every column missing from an existing table
    async fn plan_missing_columns<P>(
        &self,
        descriptor: &TableDescriptor,
        table_name: &str,
        probe: &P,
        diff: &mut SchemaDiff,
    ) -> Result<usize>
    where
        P: SchemaProbe + ?Sized,
    {
        let mut added = 0;

        for field in &descriptor.fields {
            let column = self.generator.column_name(field);
            if probe.column_exists(table_name, &column).await? {
                continue;
            }

            tracing::debug!(table = table_name, column = %column, "Adding missing column");
            diff.push_deferred(self.generator.render_add_column(table_name, field));
            if let Some(index) = self.generator.render_add_index(table_name, field) {
                diff.push_deferred(index);
            }
            added += 1;
        }

        Ok(added)
    }
}

fn table_label(descriptor: &TableDescriptor) -> &str {
    let name = descriptor.table_name.trim();
    if name.is_empty() {
        &descriptor.owner
    } else {
        name
    }
}
