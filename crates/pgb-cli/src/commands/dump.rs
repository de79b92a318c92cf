//! Dump command implementation: schema-only pg_dump pass-through

use anyhow::{Context, Result};
use pgb_client::schema_dump;

use crate::cli::{DumpArgs, GlobalArgs};
use crate::commands::common::{connection_params, load_config, ExitCode};

/// Execute the dump command
pub async fn execute(args: &DumpArgs, global: &GlobalArgs) -> Result<()> {
    let (config, _root) = load_config(global)?;
    let verbose = global.verbose || config.verbose;

    let code = schema_dump(
        &config.pg_dump,
        connection_params(&config),
        config.schema_dump_additional_args.clone(),
        args.args.clone(),
        verbose,
    )
    .await
    .context("Failed to run the dump utility")?;
    if code != 0 {
        return Err(ExitCode(code).into());
    }
    Ok(())
}
