//! Run command implementation: SQL or script pass-through to psql

use anyhow::{Context, Result};
use pgb_client::Payload;
use std::path::Path;

use crate::cli::{ExecArgs, GlobalArgs};
use crate::commands::common::{load_config, make_client, ExitCode};

/// Execute the run command
pub async fn execute(args: &ExecArgs, global: &GlobalArgs) -> Result<()> {
    let (config, _root) = load_config(global)?;
    let verbose = global.verbose || config.verbose;
    let client = make_client(&config, verbose);

    let candidate = Path::new(&args.command);
    let payload = if candidate.is_file() {
        Payload::File(candidate.to_path_buf())
    } else {
        Payload::Sql(args.command.clone())
    };

    let code = client
        .execute_with_args(payload, args.args.clone())
        .await
        .context("Failed to run the database client")?;
    if code != 0 {
        return Err(ExitCode(code).into());
    }
    Ok(())
}
