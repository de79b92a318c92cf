//! pgb-core - Core library for pgbatch
//!
//! This crate provides the migration planning engine: unit
//! classification, history reconciliation, batch planning, and script
//! assembly, plus configuration parsing and content pre-processing.
//! Planning is pure — execution is delegated to the external database
//! client behind pgb-client.
//!
//! Concurrent invocations against the same ledger are a documented
//! precondition violation: the history snapshot is taken once per run
//! and never re-validated, and no advisory lock is taken.

pub mod assemble;
pub mod checksum;
pub mod config;
pub mod error;
pub mod expand;
pub mod history;
pub mod ledger;
pub mod plan;
pub mod reconcile;
pub mod role;
pub mod unit;
pub mod version;

pub use assemble::{artifact_ident, assemble, prepare_scratch_dir, write_artifact};
pub use checksum::{compute_checksum, HashAlgorithm};
pub use config::{Config, ConnectionConfig, EnvFile};
pub use error::{CoreError, CoreResult};
pub use history::{parse_history_snapshot, HistoryIndex, HistoryRecord};
pub use plan::{plan, BatchPlan, Direction};
pub use reconcile::{Admission, Reconciler};
pub use role::Role;
pub use unit::{classify, Classified, MigrationUnit, ScanContext, SkipReason, SourceRoot};
pub use version::{compare_names, compare_versions};
