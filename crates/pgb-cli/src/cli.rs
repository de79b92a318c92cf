//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// pgbatch - ordered, idempotent PostgreSQL schema-migration batches
#[derive(Parser, Debug)]
#[command(name = "pgb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path (default: pgbatch.yml in the project)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply forward migrations: before, repeatable-before, up, repeatable, after
    Up(MigrateArgs),

    /// Apply rollback migrations only
    Down(MigrateArgs),

    /// Run a SQL command or script file with psql
    Run(ExecArgs),

    /// Dump the database schema with pg_dump
    Dump(DumpArgs),

    /// Run psql directly, or open a psql shell
    Psql(PsqlArgs),
}

/// Arguments for the up and down commands
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// List the plan without assembling or executing anything
    #[arg(long, conflicts_with_all = ["dry", "dump"])]
    pub list: bool,

    /// Execute the batch with a forced rollback (no persisted changes)
    #[arg(long)]
    pub dry: bool,

    /// Bypass history gating: plan every discovered unit
    #[arg(long)]
    pub full: bool,

    /// Print the assembled script instead of executing it
    #[arg(long)]
    pub dump: bool,

    /// Output format for --list
    #[arg(long, value_enum, default_value = "table")]
    pub output: ListOutput,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// SQL text, or a path to a script file
    pub command: String,

    /// Additional arguments passed through to psql
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the dump command
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Additional arguments passed through to pg_dump
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Arguments for the psql command
#[derive(Args, Debug)]
pub struct PsqlArgs {
    /// Additional arguments passed through to psql
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
