//! pg_dump collaborator.

use crate::error::ClientResult;
use crate::invocation::{ConnectionParams, Invocation};

/// Run a schema-only dump, streaming output. Returns the exit code.
///
/// `dump_args` come from configuration (`schema_dump_additional_args`);
/// `additional_args` are operator-supplied and appended last.
pub async fn schema_dump(
    command: impl Into<String>,
    params: ConnectionParams,
    dump_args: Vec<String>,
    additional_args: Vec<String>,
    verbose: bool,
) -> ClientResult<i32> {
    let invocation = Invocation {
        command: command.into(),
        params,
        schema_only: true,
        dump_args,
        additional_args,
        verbose,
        ..Default::default()
    };
    Ok(invocation.run().await?.exit_code)
}
