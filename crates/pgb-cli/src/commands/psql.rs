//! Psql command implementation: interactive shell or argument pass-through

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, PsqlArgs};
use crate::commands::common::{load_config, make_client, ExitCode};

/// Execute the psql command
pub async fn execute(args: &PsqlArgs, global: &GlobalArgs) -> Result<()> {
    let (config, _root) = load_config(global)?;
    let verbose = global.verbose || config.verbose;
    let client = make_client(&config, verbose);

    let code = client
        .passthrough(args.args.clone())
        .await
        .context("Failed to run psql")?;
    if code != 0 {
        return Err(ExitCode(code).into());
    }
    Ok(())
}
