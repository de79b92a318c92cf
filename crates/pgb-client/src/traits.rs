//! Database client trait definition

use crate::error::ClientResult;
use async_trait::async_trait;
use std::path::Path;

/// External database client abstraction for pgbatch.
///
/// Implementations must be Send + Sync for async operation. The planner
/// only depends on this seam: a query result string and an exit code.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Run a bare-result query and return trimmed stdout.
    /// Fails on a non-zero exit, since a plan cannot be trusted without
    /// its history snapshot.
    async fn query(&self, sql: &str) -> ClientResult<String>;

    /// Execute inline SQL, streaming output; returns the exit code
    async fn execute(&self, sql: &str) -> ClientResult<i32>;

    /// Execute a script file, streaming output; returns the exit code
    async fn execute_file(&self, path: &Path) -> ClientResult<i32>;

    /// Client identifier for logging
    fn client_name(&self) -> &str;
}
