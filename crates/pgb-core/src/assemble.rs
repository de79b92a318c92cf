//! Script assembly.
//!
//! Renders an ordered batch plan into the single transactional script
//! that performs the outstanding work: per-unit instrumentation, the
//! unit's raw content, a ledger mutation per unit, and one final rank
//! recompute. The script is written to a fresh, timestamp-named
//! artifact in the scratch directory.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::ledger::{delete_paired_up_sql, escape_literal, update_ranks_sql, upsert_history_sql};
use crate::plan::BatchPlan;
use crate::role::Role;
use crate::unit::MigrationUnit;
use std::path::{Path, PathBuf};

/// Timestamp-derived identifier for one assembled artifact
pub fn artifact_ident() -> String {
    chrono::Utc::now().format("%Y%m%d%H%M%S%3f").to_string()
}

/// Render the plan into one executable script.
///
/// `ident` ties the artifact filename and the script's dollar-quote tag
/// together; `dry_run` appends an unconditional rollback as the final
/// wrapped statement.
pub fn assemble(
    plan: &BatchPlan,
    config: &Config,
    ident: &str,
    dry_run: bool,
) -> CoreResult<String> {
    let mut out = String::new();
    header(&mut out);

    if config.use_procedural_script {
        out.push_str(&format!(
            "do\n$migration_{ident}$\ndeclare ___clock timestamp with time zone;\nbegin\n\n"
        ));
    } else {
        out.push_str("begin;\n\n");
    }

    let elapsed = if config.use_procedural_script {
        "(clock_timestamp() - ___clock)"
    } else {
        "(clock_timestamp() - transaction_timestamp())"
    };

    for (index, unit) in plan.ordered_units().into_iter().enumerate() {
        append_unit(&mut out, unit, index + 1, elapsed, config)?;
    }

    out.push_str("-- Update ledger ranks\n");
    out.push_str(&update_ranks_sql(config)?);
    out.push('\n');

    if config.use_procedural_script {
        if dry_run {
            out.push_str("\nraise info 'Rolling back migration changes...';\nrollback;\n");
        }
        out.push_str(&format!("\nend;\n$migration_{ident}$;\n"));
    } else if dry_run {
        out.push_str("\n\\echo Rolling back migration changes...\nrollback;\n");
    } else {
        out.push_str("\ncommit;\n");
    }

    Ok(out)
}

fn header(out: &mut String) {
    out.push_str(&format!(
        "--\n-- Migration batch generated by pgbatch\n-- Date: {}\n--\n\n",
        chrono::Utc::now().to_rfc3339()
    ));
}

/// Emit one unit: header comment, progress notice, timer start, raw
/// content, and its ledger mutation.
fn append_unit(
    out: &mut String,
    unit: &MigrationUnit,
    index: usize,
    elapsed: &str,
    config: &Config,
) -> CoreResult<()> {
    out.push_str(&format!(
        "--\n-- Migration {index}\n-- Script: {}\n-- Type: {}\n--\n",
        unit.script,
        unit.role.label()
    ));

    if config.use_procedural_script {
        out.push_str(&format!(
            "raise info 'Running migration %: %. Script file: %', {index}, '{}', '{}';\n",
            escape_literal(&unit.name),
            escape_literal(&unit.script)
        ));
        out.push_str("___clock = clock_timestamp();\n");
    } else {
        out.push_str(&format!(
            "\\echo Running migration {index}: {} ({})\n",
            unit.name, unit.script
        ));
    }

    out.push_str(&format!("-- Migration {index} start\n"));
    out.push_str(&unit.content);
    if !unit.content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&format!("-- Migration {index} end\n"));

    let mutation = if unit.role == Role::Down {
        delete_paired_up_sql(config, unit)?
    } else {
        upsert_history_sql(config, unit, elapsed)?
    };
    out.push_str(&mutation);
    out.push_str("\n\n");
    Ok(())
}

/// Create the scratch directory, clearing prior artifacts unless the
/// configuration asks to keep them.
pub fn prepare_scratch_dir(config: &Config, project_root: &Path) -> CoreResult<PathBuf> {
    let dir = config.tmp_dir_absolute(project_root);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        return Ok(dir);
    }
    if !config.keep_migration_dir_history {
        for entry in std::fs::read_dir(&dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })? {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?;
            if entry.path().is_file() {
                std::fs::remove_file(entry.path()).map_err(|e| CoreError::IoWithPath {
                    path: entry.path().display().to_string(),
                    source: e,
                })?;
            }
        }
    }
    Ok(dir)
}

/// Write an assembled script into the scratch directory
pub fn write_artifact(dir: &Path, file_name: &str, sql: &str) -> CoreResult<PathBuf> {
    let path = dir.join(file_name);
    std::fs::write(&path, sql).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(path)
}

#[cfg(test)]
#[path = "assemble_test.rs"]
mod tests;
