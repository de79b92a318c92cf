//! pgb-client - External client boundary for pgbatch
//!
//! Spawns the configured psql / pg_dump executables as child processes,
//! streams their interleaved output through a severity router, and hands
//! exit codes back to the caller. This crate knows nothing about
//! migrations; it is the single suspension point of a pgbatch run.

pub mod dump;
pub mod error;
pub mod invocation;
pub mod output;
pub mod psql;
pub mod traits;

pub use dump::schema_dump;
pub use error::{ClientError, ClientResult};
pub use invocation::{ConnectionParams, Invocation, InvocationOutput, Payload};
pub use output::{classify_line, report_line, Severity};
pub use psql::PsqlClient;
pub use traits::DatabaseClient;
