//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use pgb_client::{ConnectionParams, PsqlClient};
use pgb_core::Config;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly. main.rs
/// downcasts to this type to pick the final exit status.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error; the cause has already been reported.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Process exit status for a planning conflict (duplicate versions)
pub(crate) const EXIT_PLAN_CONFLICT: i32 = 2;
/// Process exit status for a failed batch execution
pub(crate) const EXIT_EXECUTION_FAILED: i32 = 3;

/// Resolve the project root from global CLI arguments
pub(crate) fn project_root(global: &GlobalArgs) -> Result<PathBuf> {
    let raw = Path::new(&global.project_dir);
    let root = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        std::env::current_dir()?.join(raw)
    };
    anyhow::ensure!(
        root.is_dir(),
        "Project directory not found: {}",
        root.display()
    );
    Ok(root)
}

/// Load configuration honoring the --config override and env-file merge
pub(crate) fn load_config(global: &GlobalArgs) -> Result<(Config, PathBuf)> {
    let root = project_root(global)?;
    let mut config = match &global.config {
        Some(path) => {
            let path = root.join(path);
            if global.verbose {
                eprintln!("[verbose] Using config file: {}", path.display());
            }
            Config::load(&path)
        }
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load configuration")?;
    config.apply_env_file(&root)?;
    Ok((config, root))
}

/// Map the config connection block onto client parameters
pub(crate) fn connection_params(config: &Config) -> ConnectionParams {
    ConnectionParams {
        host: config.connection.host.clone(),
        port: config.connection.port.clone(),
        dbname: config.connection.dbname.clone(),
        username: config.connection.username.clone(),
        password: config.connection.password.clone(),
    }
}

/// Build the psql client from configuration
pub(crate) fn make_client(config: &Config, verbose: bool) -> PsqlClient {
    PsqlClient::new(&config.psql, connection_params(config), verbose)
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }
    widths
}

/// Print a formatted table to stdout: a header row, a dashed separator,
/// and each data row, columns separated by two spaces.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  "));

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  "));
    }
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
