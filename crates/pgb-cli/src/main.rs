//! pgbatch CLI - plan and apply ordered, idempotent PostgreSQL migration batches

use clap::Parser;
use pgb_core::Direction;

mod cli;
mod commands;

use cli::Cli;
use commands::{common::ExitCode, dump, exec, migrate, psql};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Up(args) => migrate::execute(Direction::Up, args, &cli.global).await,
        cli::Commands::Down(args) => migrate::execute(Direction::Down, args, &cli.global).await,
        cli::Commands::Run(args) => exec::execute(args, &cli.global).await,
        cli::Commands::Dump(args) => dump::execute(args, &cli.global).await,
        cli::Commands::Psql(args) => psql::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
