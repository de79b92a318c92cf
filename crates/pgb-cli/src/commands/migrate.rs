//! Up and down command implementation: the execution gate.
//!
//! Orchestrates one invocation end to end: history snapshot (fetched
//! exactly once), planning, list/dump short-circuits, script assembly,
//! the single psql execution, and the finalize fan-out afterwards.

use anyhow::{Context, Result};
use pgb_client::{DatabaseClient, PsqlClient};
use pgb_core::ledger::{create_history_table_sql, history_query_sql, table_exists_sql};
use pgb_core::{
    artifact_ident, assemble, parse_history_snapshot, plan, prepare_scratch_dir, write_artifact,
    BatchPlan, Config, CoreError, Direction, HistoryRecord, MigrationUnit,
};
use serde::Serialize;
use std::path::Path;

use crate::cli::{GlobalArgs, ListOutput, MigrateArgs};
use crate::commands::common::{
    load_config, make_client, print_table, ExitCode, EXIT_EXECUTION_FAILED, EXIT_PLAN_CONFLICT,
};

/// Execute the up or down command
pub async fn execute(direction: Direction, args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let (config, root) = load_config(global)?;
    let verbose = global.verbose || config.verbose;
    let client = make_client(&config, verbose);

    // One snapshot per invocation; --full skips the ledger read entirely.
    let history = if args.full {
        Vec::new()
    } else {
        fetch_history(&client, &config, verbose).await?
    };

    let batch = match plan(&root, direction, &history, &config, args.full) {
        Ok(batch) => batch,
        Err(err @ CoreError::DuplicateVersion { .. }) => {
            eprintln!("{err}");
            return Err(ExitCode(EXIT_PLAN_CONFLICT).into());
        }
        Err(err) => return Err(err.into()),
    };

    for warning in &batch.warnings {
        eprintln!("[warn] {warning}");
    }

    if args.list {
        list_plan(&batch, args.output);
        return Ok(());
    }

    if batch.is_empty() {
        println!("Nothing to migrate.");
        if !args.dump && !args.dry {
            run_finalize(&client, &batch, &config, &root).await?;
        }
        return Ok(());
    }

    let scratch = prepare_scratch_dir(&config, &root)?;
    let ident = artifact_ident();
    let sql = assemble(&batch, &config, &ident, args.dry)?;
    let artifact = write_artifact(&scratch, &format!("migration_{ident}.sql"), &sql)?;
    if verbose {
        eprintln!("[verbose] Assembled migration file: {}", artifact.display());
    }

    if args.dump {
        println!("{sql}");
        return Ok(());
    }

    // The assembled script upserts into the ledger, so in full mode the
    // table still has to exist even though it was never read.
    if args.full {
        let code = client
            .execute(&create_history_table_sql(&config)?)
            .await
            .context("Failed to ensure the history table exists")?;
        anyhow::ensure!(code == 0, "Failed to create the history table (exit {code})");
    }

    println!(
        "Running migration ({} unit{})...",
        batch.batch_len(),
        if batch.batch_len() == 1 { "" } else { "s" }
    );
    let code = client
        .execute_file(&artifact)
        .await
        .context("Failed to run the database client")?;
    if code != 0 {
        eprintln!(
            "Migration failed with exit code {code}. The transactional wrapper guarantees \
             no partial changes were persisted."
        );
        eprintln!("Migration file kept for inspection: {}", artifact.display());
        return Err(ExitCode(EXIT_EXECUTION_FAILED).into());
    }

    println!("Migration completed successfully.");
    println!("Migration file available: {}", artifact.display());

    if args.dry {
        // Finalize scripts run outside the transaction and would persist
        // real changes; a dry run must stay side-effect free.
        if !batch.finalize.is_empty() {
            println!(
                "Dry run: skipping {} finalize script{}.",
                batch.finalize.len(),
                if batch.finalize.len() == 1 { "" } else { "s" }
            );
        }
        return Ok(());
    }

    run_finalize(&client, &batch, &config, &root).await
}

/// Fetch the history snapshot, lazily creating the ledger on first use.
async fn fetch_history(
    client: &PsqlClient,
    config: &Config,
    verbose: bool,
) -> Result<Vec<HistoryRecord>> {
    let exists = client
        .query(&table_exists_sql(config)?)
        .await
        .context("Failed to query the migration ledger")?;

    if exists != "t" {
        if verbose {
            eprintln!("[verbose] Creating history table...");
        }
        let code = client
            .execute(&create_history_table_sql(config)?)
            .await
            .context("Failed to create the history table")?;
        anyhow::ensure!(code == 0, "Failed to create the history table (exit {code})");
        return Ok(Vec::new());
    }

    let json = client
        .query(&history_query_sql(config)?)
        .await
        .context("Failed to read the migration ledger")?;
    Ok(parse_history_snapshot(&json)?)
}

/// Row shape for --list output
#[derive(Debug, Serialize)]
struct ListRow<'a> {
    rank: usize,
    name: &'a str,
    version: Option<&'a str>,
    #[serde(rename = "type")]
    role: &'static str,
    script: &'a str,
    hash: &'a str,
}

fn list_rows(batch: &BatchPlan) -> Vec<ListRow<'_>> {
    batch
        .ordered_units()
        .into_iter()
        .enumerate()
        .map(|(index, unit)| ListRow {
            rank: index + 1,
            name: &unit.name,
            version: unit.version.as_deref(),
            role: unit.role.label(),
            script: &unit.script,
            hash: &unit.hash,
        })
        .collect()
}

fn list_plan(batch: &BatchPlan, output: ListOutput) {
    let rows = list_rows(batch);
    match output {
        ListOutput::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).expect("list rows serialize")
            );
        }
        ListOutput::Table => {
            if rows.is_empty() {
                println!("Nothing to migrate.");
                return;
            }
            let table_rows: Vec<Vec<String>> = rows
                .iter()
                .map(|row| {
                    vec![
                        row.rank.to_string(),
                        row.name.to_string(),
                        row.version.unwrap_or("").to_string(),
                        row.role.to_string(),
                        row.script.to_string(),
                        row.hash.to_string(),
                    ]
                })
                .collect();
            print_table(
                &["RANK", "NAME", "VERSION", "TYPE", "SCRIPT", "HASH"],
                &table_rows,
            );
        }
    }
}

/// Run finalize units after a successful (or already-satisfied) batch.
///
/// Each unit is its own non-transactional psql invocation; they run
/// concurrently and a failure in one never blocks the others.
async fn run_finalize(
    client: &PsqlClient,
    batch: &BatchPlan,
    config: &Config,
    root: &Path,
) -> Result<()> {
    if batch.finalize.is_empty() {
        return Ok(());
    }

    // Never clears: the batch artifact was written here moments ago.
    let scratch = config.tmp_dir_absolute(root);
    std::fs::create_dir_all(&scratch)
        .with_context(|| format!("Failed to create {}", scratch.display()))?;
    let ident = artifact_ident();
    println!(
        "Running {} finalize script{}...",
        batch.finalize.len(),
        if batch.finalize.len() == 1 { "" } else { "s" }
    );

    let mut pending = Vec::new();
    for (index, unit) in batch.finalize.iter().enumerate() {
        let file_name = format!("finalize_{ident}_{}.sql", index + 1);
        let path = write_artifact(&scratch, &file_name, &unit.content)?;
        pending.push(run_one_finalize(client, unit, path));
    }

    let results = futures::future::join_all(pending).await;
    let failed = results.iter().filter(|ok| !**ok).count();
    if failed > 0 {
        eprintln!(
            "{failed} finalize script{} failed; batch changes are already committed.",
            if failed == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

async fn run_one_finalize(client: &PsqlClient, unit: &MigrationUnit, path: std::path::PathBuf) -> bool {
    match client.execute_file(&path).await {
        Ok(0) => {
            println!("  \u{2713} {}", unit.name);
            true
        }
        Ok(code) => {
            eprintln!("  \u{2717} {} (exit {code})", unit.name);
            false
        }
        Err(e) => {
            eprintln!("  \u{2717} {} ({e})", unit.name);
            false
        }
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
