//! History reconciliation.
//!
//! Decides, unit by unit, what is new work and what is already
//! satisfied, against the history snapshot taken at the start of the
//! run. Duplicate versions among *discovered* units are fatal: silently
//! choosing one script for a version would be data loss.

use crate::error::{CoreError, CoreResult};
use crate::history::HistoryIndex;
use crate::role::Role;
use crate::unit::MigrationUnit;
use std::collections::HashMap;

/// Verdict for one classified unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// New work, goes into the plan
    Accepted,
    /// Already satisfied by a history record
    AlreadyApplied,
    /// Down unit whose version was never applied
    NoMatchingUp,
}

/// Per-invocation reconciliation state.
///
/// The duplicate-version maps are owned here, not in ambient state, so a
/// reconciler is valid for exactly one planning pass.
pub struct Reconciler<'a> {
    index: &'a HistoryIndex,
    full: bool,
    up_versions: HashMap<String, String>,
    down_versions: HashMap<String, String>,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler over one history snapshot.
    ///
    /// `full` bypasses all history gating; duplicate detection still
    /// applies.
    pub fn new(index: &'a HistoryIndex, full: bool) -> Self {
        Self {
            index,
            full,
            up_versions: HashMap::new(),
            down_versions: HashMap::new(),
        }
    }

    /// Judge one unit, attaching the paired Up record to accepted Down
    /// units.
    pub fn admit(&mut self, unit: &mut MigrationUnit) -> CoreResult<Admission> {
        match unit.role {
            Role::Up => {
                let version = self.register_version(unit, Role::Up)?;
                if !self.full && self.index.applied_up(&version).is_some() {
                    return Ok(Admission::AlreadyApplied);
                }
                Ok(Admission::Accepted)
            }
            Role::Down => {
                let version = self.register_version(unit, Role::Down)?;
                if self.full {
                    return Ok(Admission::Accepted);
                }
                match self.index.applied_up(&version) {
                    Some(applied) => {
                        unit.paired_up = Some(applied.clone());
                        Ok(Admission::Accepted)
                    }
                    None => Ok(Admission::NoMatchingUp),
                }
            }
            Role::Repeatable | Role::RepeatableBefore => {
                if !self.full && self.index.has_repeatable(&unit.hash, &unit.script) {
                    return Ok(Admission::AlreadyApplied);
                }
                Ok(Admission::Accepted)
            }
            Role::Before | Role::After | Role::Finalize => Ok(Admission::Accepted),
        }
    }

    /// Record a discovered version, failing on a duplicate.
    fn register_version(&mut self, unit: &MigrationUnit, role: Role) -> CoreResult<String> {
        let version = unit
            .version
            .clone()
            .expect("versioned unit always carries a version");
        let seen = match role {
            Role::Up => &mut self.up_versions,
            Role::Down => &mut self.down_versions,
            _ => unreachable!("only versioned roles register versions"),
        };
        if let Some(existing) = seen.get(&version) {
            return Err(CoreError::DuplicateVersion {
                role: role.label(),
                version,
                script: unit.script.clone(),
                existing: existing.clone(),
            });
        }
        seen.insert(version.clone(), unit.script.clone());
        Ok(version)
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
