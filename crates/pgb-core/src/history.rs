//! Persisted ledger rows and the per-invocation history snapshot.
//!
//! The snapshot is fetched exactly once per run, as a single JSON
//! document (`json_agg`) produced by the external client, and never
//! re-queried mid-plan.

use crate::error::{CoreError, CoreResult};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One row of the ledger table, keyed by `(name, role)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Stable audit position, recomputed after every batch
    #[serde(default)]
    pub rank: Option<i32>,

    /// Display name of the applied unit
    pub name: String,

    /// Role code from the `type` column
    #[serde(rename = "type")]
    pub role: Role,

    /// Version for Up rows, null otherwise
    #[serde(default)]
    pub version: Option<String>,

    /// Path-derived stable identity of the source file
    pub script: String,

    /// Content fingerprint at application time
    pub hash: String,

    /// Database role that applied the unit
    #[serde(default)]
    pub installed_by: String,

    /// Application timestamp, kept as the text Postgres emitted
    #[serde(default)]
    pub installed_on: String,

    /// Execution interval, kept as the text Postgres emitted
    #[serde(default)]
    pub execution_time: String,
}

/// Parse the `json_agg` snapshot text returned by the client.
///
/// An empty or whitespace-only payload (no ledger rows) is an empty
/// history, not an error.
pub fn parse_history_snapshot(json: &str) -> CoreResult<Vec<HistoryRecord>> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|e| CoreError::HistorySnapshot {
        message: e.to_string(),
    })
}

/// Lookup structures the reconciler needs, built once from the snapshot
#[derive(Debug, Default)]
pub struct HistoryIndex {
    /// `(hash, script)` pairs of applied repeatable-family rows
    repeatable: HashSet<(String, String)>,
    /// Applied Up rows by version
    up_by_version: HashMap<String, HistoryRecord>,
}

impl HistoryIndex {
    /// Build the index from a history snapshot
    pub fn build(records: &[HistoryRecord]) -> Self {
        let mut index = HistoryIndex::default();
        for record in records {
            if record.role.is_repeatable_family() {
                index
                    .repeatable
                    .insert((record.hash.clone(), record.script.clone()));
            }
            if record.role == Role::Up {
                if let Some(version) = &record.version {
                    index.up_by_version.insert(version.clone(), record.clone());
                }
            }
        }
        index
    }

    /// Whether a repeatable-family unit with this content was already applied
    pub fn has_repeatable(&self, hash: &str, script: &str) -> bool {
        self.repeatable
            .contains(&(hash.to_string(), script.to_string()))
    }

    /// The applied Up record for a version, if any
    pub fn applied_up(&self, version: &str) -> Option<&HistoryRecord> {
        self.up_by_version.get(version)
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
