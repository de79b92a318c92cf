//! Error types for pgb-core

use thiserror::Error;

/// Core error type for pgbatch
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: A configured migration root is missing or not a directory
    #[error("[E003] Migration directory not found: {path}")]
    MigrationRootNotFound { path: String },

    /// E004: Two discovered units resolve to the same version
    #[error("[E004] Duplicate {role} version {version}: {script} conflicts with {existing}")]
    DuplicateVersion {
        role: &'static str,
        version: String,
        script: String,
        existing: String,
    },

    /// E005: Include directive points at a missing file
    #[error("[E005] Include not found in {script}: {include}")]
    IncludeNotFound { script: String, include: String },

    /// E006: Include directives form a cycle
    #[error("[E006] Include cycle detected: {cycle}")]
    IncludeCycle { cycle: String },

    /// E007: The history snapshot returned by the database client could not be parsed
    #[error("[E007] Failed to parse history snapshot: {message}")]
    HistorySnapshot { message: String },

    /// E008: A value destined for generated SQL is not a safe identifier
    #[error("[E008] Invalid SQL identifier: {ident}")]
    InvalidIdentifier { ident: String },

    /// E009: A SQL template references a slot the caller did not provide
    #[error("[E009] Unknown template slot: {slot}")]
    UnknownTemplateSlot { slot: String },

    /// E010: IO error
    #[error("[E010] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E011: IO error with file path context
    #[error("[E011] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E012: Config YAML parse error
    #[error("[E012] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
