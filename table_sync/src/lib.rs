//! TableSync: creates and incrementally updates MySQL tables from entity structs
//!
//! TableSync lets you describe your tables with Rust structs and brings the
//! database in line with them, either by recreating every table or by adding
//! whatever tables and columns are missing.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod schema;
pub mod sync;
pub mod utils;

// Re-export main types for easier access
pub use config::{Config, SyncConfig, SyncMode, TableErrorPolicy};
pub use db::connection::DatabaseConnection;
pub use db::executor::{SqlExecutor, StatementExecutor};
pub use error::{Error, Result};
pub use models::registry::{load_descriptors, Entity, EntityRegistry};
pub use schema::analyzer::{MySqlProbe, SchemaProbe};
pub use schema::diff::{SchemaDiff, TablePlan, TableState};
pub use schema::generator::DdlGenerator;
pub use schema::types::{
    ColumnType, CompositeIndexSpec, FieldDescriptor, FieldType, IndexSpec, PrimaryKeySpec,
    TableDescriptor, ValueKind,
};
pub use sync::Synchronizer;
pub use table_sync_macros::Entity;

/// Initialize TableSync with the specified configuration file
pub fn init(config_path: &str) -> Result<TableSyncClient> {
    let config = config::load_from_file(config_path)?;
    Ok(TableSyncClient::new(config))
}

/// The main client for interacting with TableSync
pub struct TableSyncClient {
    config: Config,
    registry: EntityRegistry,
}

impl TableSyncClient {
    /// Create a new TableSync client from configuration
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: EntityRegistry::new(),
        }
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    /// Register a local entity type
    pub fn register<E: models::Entity>(&mut self) -> &mut Self {
        self.registry.register::<E>();
        self
    }

    /// Plan the run against any probe, without touching a database
    pub async fn plan_with<P>(&self, probe: &P) -> Result<SchemaDiff>
    where
        P: SchemaProbe + ?Sized,
    {
        let descriptors = self.registry.discover(&self.config.sync);
        Synchronizer::new(&self.config.sync)
            .plan(&descriptors, probe)
            .await
    }

    /// Execute a planned diff, or log it when running dry
    pub async fn apply<E>(&self, diff: &SchemaDiff, target: &E) -> Result<usize>
    where
        E: StatementExecutor + ?Sized,
    {
        let statements = diff.statements();

        if self.config.sync.dry_run {
            // Just log the statements without applying
            for (i, statement) in statements.iter().enumerate() {
                tracing::info!(statement_number = i + 1, sql = %statement, "Statement (dry run)");
            }
            return Ok(0);
        }

        SqlExecutor::new(target, self.config.sync.show_sql)
            .execute_all(&statements)
            .await
    }

    /// Complete workflow: discover descriptors, probe the database, apply DDL
    ///
    /// The connection is opened for the run and closed before returning,
    /// whether or not the run succeeded.
    pub async fn sync_database(&self) -> Result<SchemaDiff> {
        let mode = self.config.sync.mode;
        if mode == SyncMode::None {
            tracing::info!("Sync mode is none; leaving the database untouched");
            return Ok(SchemaDiff::new());
        }

        tracing::info!(mode = ?mode, "Starting schema sync");
        let connection = DatabaseConnection::connect(&self.config.database).await?;

        let result = async {
            let diff = self.plan_with(&MySqlProbe::new(&connection)).await?;

            if diff.is_empty() {
                tracing::info!("Database schema is already in sync with entities");
                return Ok(diff);
            }

            let executed = self.apply(&diff, &connection).await?;
            tracing::info!(executed, "Schema sync finished");
            Ok::<SchemaDiff, Error>(diff)
        }
        .await;

        connection.close().await;
        result
    }
}
