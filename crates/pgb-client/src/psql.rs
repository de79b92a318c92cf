//! psql-backed implementation of the client trait.

use crate::error::{ClientError, ClientResult};
use crate::invocation::{ConnectionParams, Invocation, Payload};
use crate::traits::DatabaseClient;
use async_trait::async_trait;
use std::path::Path;

/// The external psql client
pub struct PsqlClient {
    command: String,
    params: ConnectionParams,
    verbose: bool,
}

impl PsqlClient {
    /// Create a client for a configured psql executable
    pub fn new(command: impl Into<String>, params: ConnectionParams, verbose: bool) -> Self {
        Self {
            command: command.into(),
            params,
            verbose,
        }
    }

    fn invocation(&self) -> Invocation {
        Invocation {
            command: self.command.clone(),
            params: self.params.clone(),
            verbose: self.verbose,
            ..Default::default()
        }
    }

    /// Run psql attached to the terminal (interactive shell or
    /// pass-through arguments). Returns the exit code.
    pub async fn passthrough(&self, additional_args: Vec<String>) -> ClientResult<i32> {
        let invocation = Invocation {
            additional_args,
            inherit_stdio: true,
            ..self.invocation()
        };
        Ok(invocation.run().await?.exit_code)
    }

    /// Execute inline SQL or a script file with extra arguments,
    /// streaming output. Used by the run/exec pass-through command.
    pub async fn execute_with_args(
        &self,
        payload: Payload,
        additional_args: Vec<String>,
    ) -> ClientResult<i32> {
        let invocation = Invocation {
            payload,
            additional_args,
            ..self.invocation()
        };
        Ok(invocation.run().await?.exit_code)
    }
}

#[async_trait]
impl DatabaseClient for PsqlClient {
    async fn query(&self, sql: &str) -> ClientResult<String> {
        let invocation = Invocation {
            payload: Payload::Sql(sql.to_string()),
            tuples_only: true,
            muted: true,
            ..self.invocation()
        };
        let output = invocation.run().await?;
        if !output.success() {
            return Err(ClientError::QueryFailed {
                command: self.command.clone(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output.stdout.trim().to_string())
    }

    async fn execute(&self, sql: &str) -> ClientResult<i32> {
        let invocation = Invocation {
            payload: Payload::Sql(sql.to_string()),
            ..self.invocation()
        };
        Ok(invocation.run().await?.exit_code)
    }

    async fn execute_file(&self, path: &Path) -> ClientResult<i32> {
        let invocation = Invocation {
            payload: Payload::File(path.to_path_buf()),
            ..self.invocation()
        };
        Ok(invocation.run().await?.exit_code)
    }

    fn client_name(&self) -> &str {
        &self.command
    }
}

#[cfg(test)]
#[path = "psql_test.rs"]
mod tests;
