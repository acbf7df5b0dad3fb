//! Configuration handling for TableSync

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Load configuration from a TOML file, or YAML when the extension says so
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = if is_yaml(Path::new(path)) {
        serde_yaml::from_str(&config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?
    } else {
        toml::from_str(&config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?
    };

    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Represents the complete TableSync configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    pub logging: Option<LoggingConfig>,
}

/// Database connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub connect_timeout_seconds: Option<u64>,
}

/// What a run does with the managed tables
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Leave the database untouched
    #[default]
    None,
    /// Drop and recreate every managed table
    Create,
    /// Create missing tables and add missing columns
    Update,
}

impl std::str::FromStr for SyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SyncMode::None),
            "create" => Ok(SyncMode::Create),
            "update" => Ok(SyncMode::Update),
            other => Err(Error::ConfigError(format!("Unknown sync mode: {}", other))),
        }
    }
}

/// What to do when a single table descriptor is misconfigured
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TableErrorPolicy {
    /// Stop the run before anything is executed
    #[default]
    Abort,
    /// Log the error, drop that table's statements and continue
    Skip,
}

/// Synchronization behavior
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SyncConfig {
    pub mode: SyncMode,
    /// Module path roots searched for entity descriptors
    pub packages: Vec<String>,
    /// Log every statement before it runs
    pub show_sql: bool,
    /// Uppercase derived column names
    pub uppercase: bool,
    /// Also discover descriptors exported by dependency crates
    pub scan_archives: bool,
    /// Plan and log statements without executing them
    pub dry_run: bool,
    pub on_table_error: TableErrorPolicy,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}
