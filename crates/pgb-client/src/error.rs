//! Error types for pgb-client

use thiserror::Error;

/// External client invocation errors
#[derive(Error, Debug)]
pub enum ClientError {
    /// Failed to spawn the client executable (C001)
    #[error("[C001] Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// A query invocation exited non-zero (C002)
    #[error("[C002] '{command}' exited with code {code}: {stderr}")]
    QueryFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// IO error while streaming client output (C003)
    #[error("[C003] IO error while reading client output: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ClientError
pub type ClientResult<T> = Result<T, ClientError>;
