//! Error types for TableSync

use thiserror::Error;

/// Result type for TableSync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for TableSync
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Probe error on {object}: {message}")]
    ProbeError { object: String, message: String },

    #[error("Execution error in `{statement}`: {message}")]
    ExecutionError { statement: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// Whether this error is scoped to a single table descriptor
    pub fn is_table_scoped(&self) -> bool {
        matches!(self, Error::ConfigError(_))
    }
}

/// Convert Serde JSON errors to TableSync errors
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert YAML errors to TableSync errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::SerializationError(error.to_string())
    }
}

/// Convert TOML deserialization errors to TableSync errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
