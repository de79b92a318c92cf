//! Batch planning.
//!
//! Expands the configured source roots, classifies and reconciles every
//! discovered file, and produces the ordered, role-bucketed plan for one
//! invocation. Planning is pure: it reads the filesystem and an
//! in-memory history snapshot, and never touches the database.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::history::{HistoryIndex, HistoryRecord};
use crate::reconcile::{Admission, Reconciler};
use crate::role::Role;
use crate::unit::{classify, Classified, MigrationUnit, ScanContext, SourceRoot};
use crate::version::{compare_names, compare_versions};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Requested migration direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Forward: Before, RepeatableBefore, Up, Repeatable, After
    Up,
    /// Rollback: Down only
    Down,
}

impl Direction {
    /// Whether a role participates in this direction.
    ///
    /// Finalize units are collected in both directions; they live outside
    /// the batch.
    pub fn includes(&self, role: Role) -> bool {
        match role {
            Role::Finalize => true,
            Role::Down => *self == Direction::Down,
            _ => *self == Direction::Up,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// The ordered units selected for one invocation
#[derive(Debug, Default)]
pub struct BatchPlan {
    pub before: Vec<MigrationUnit>,
    pub repeatable_before: Vec<MigrationUnit>,
    pub up: Vec<MigrationUnit>,
    pub repeatable: Vec<MigrationUnit>,
    pub after: Vec<MigrationUnit>,
    pub down: Vec<MigrationUnit>,
    /// Run outside the batch transaction, after the batch outcome
    pub finalize: Vec<MigrationUnit>,
    /// Non-fatal diagnostics collected while planning
    pub warnings: Vec<String>,
}

impl BatchPlan {
    /// Batch units in fixed application order (finalize excluded)
    pub fn ordered_units(&self) -> Vec<&MigrationUnit> {
        self.before
            .iter()
            .chain(self.repeatable_before.iter())
            .chain(self.up.iter())
            .chain(self.repeatable.iter())
            .chain(self.after.iter())
            .chain(self.down.iter())
            .collect()
    }

    /// Number of units inside the batch transaction
    pub fn batch_len(&self) -> usize {
        self.before.len()
            + self.repeatable_before.len()
            + self.up.len()
            + self.repeatable.len()
            + self.after.len()
            + self.down.len()
    }

    /// True when there is nothing to migrate (finalize units aside)
    pub fn is_empty(&self) -> bool {
        self.batch_len() == 0
    }

    fn bucket_mut(&mut self, role: Role) -> &mut Vec<MigrationUnit> {
        match role {
            Role::Before => &mut self.before,
            Role::RepeatableBefore => &mut self.repeatable_before,
            Role::Up => &mut self.up,
            Role::Repeatable => &mut self.repeatable,
            Role::After => &mut self.after,
            Role::Down => &mut self.down,
            Role::Finalize => &mut self.finalize,
        }
    }
}

/// Produce the batch plan for one invocation.
///
/// `history` is the snapshot taken at the start of the run; pass an
/// empty slice with `full = true` to bypass history gating entirely.
pub fn plan(
    project_root: &Path,
    direction: Direction,
    history: &[HistoryRecord],
    config: &Config,
    full: bool,
) -> CoreResult<BatchPlan> {
    let roots = expand_roots(project_root, config)?;
    let skip_pattern = config
        .skip_pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|e| CoreError::ConfigInvalid {
            message: format!("skip_pattern is not a valid regex: {e}"),
        })?;

    let index = HistoryIndex::build(history);
    let mut reconciler = Reconciler::new(&index, full);
    let mut ctx = ScanContext::new(roots.len() > 1);
    let mut batch = BatchPlan::default();

    for root in &roots {
        for rel_path in collect_files(&root.path, config.recursive_dirs)? {
            if let Some(pattern) = &skip_pattern {
                let file_name = rel_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default();
                if pattern.is_match(file_name) {
                    log::debug!("Skip pattern matched {}", rel_path.display());
                    continue;
                }
            }

            let mut unit = match classify(&rel_path, root, direction, config, &mut ctx)? {
                Classified::Unit(unit) => unit,
                Classified::Skip(_) => continue,
            };

            match reconciler.admit(&mut unit)? {
                Admission::Accepted => {
                    let source_dir = unit
                        .path
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.path.clone());
                    unit.name = ctx.claim_name(unit.role, &unit.name, &source_dir);
                    batch.bucket_mut(unit.role).push(unit);
                }
                Admission::AlreadyApplied | Admission::NoMatchingUp => {}
            }
        }
    }

    sort_plan(&mut batch, config);
    batch.warnings = ctx.warnings;
    Ok(batch)
}

/// Apply the per-bucket ordering rules.
fn sort_plan(batch: &mut BatchPlan, config: &Config) {
    let by_name_or_path = |a: &MigrationUnit, b: &MigrationUnit| {
        if config.sort_by_path {
            compare_names(&a.script, &b.script)
        } else {
            compare_names(&a.name, &b.name)
        }
    };

    batch.before.sort_by(by_name_or_path);
    batch.repeatable_before.sort_by(by_name_or_path);
    batch.repeatable.sort_by(by_name_or_path);
    batch.after.sort_by(by_name_or_path);
    batch.finalize.sort_by(by_name_or_path);

    let version_of = |u: &MigrationUnit| u.version.clone().unwrap_or_default();
    batch
        .up
        .sort_by(|a, b| compare_versions(&version_of(a), &version_of(b)));
    // Rollbacks apply in the exact reverse of forward order.
    batch
        .down
        .sort_by(|a, b| compare_versions(&version_of(b), &version_of(a)));
}

/// Expand configured roots into resolved, deduplicated source roots.
fn expand_roots(project_root: &Path, config: &Config) -> CoreResult<Vec<SourceRoot>> {
    let mut roots = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();

    let mut push = |configured: &str, hint: Option<Role>, roots: &mut Vec<SourceRoot>| {
        let raw = Path::new(configured);
        let path = if raw.is_absolute() {
            raw.to_path_buf()
        } else {
            project_root.join(raw)
        };
        let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            roots.push(SourceRoot {
                path,
                configured: configured.to_string(),
                role_hint: hint,
            });
        }
    };

    for dir in &config.migration_dirs {
        push(dir, None, &mut roots);
    }
    for (role, dirs) in config.role_dirs() {
        for dir in dirs {
            push(dir, Some(role), &mut roots);
        }
    }

    for root in &roots {
        if !root.path.is_dir() {
            return Err(CoreError::MigrationRootNotFound {
                path: root.path.display().to_string(),
            });
        }
    }

    Ok(roots)
}

/// List a root's files as root-relative paths, sorted for determinism.
fn collect_files(root: &Path, recursive: bool) -> CoreResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_dir(root, Path::new(""), recursive, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(
    root: &Path,
    rel: &Path,
    recursive: bool,
    files: &mut Vec<PathBuf>,
) -> CoreResult<()> {
    let dir = root.join(rel);
    for entry in std::fs::read_dir(&dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })? {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let entry_rel = rel.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| CoreError::IoWithPath {
            path: entry.path().display().to_string(),
            source: e,
        })?;
        if file_type.is_dir() {
            if recursive {
                walk_dir(root, &entry_rel, recursive, files)?;
            }
            continue;
        }
        files.push(entry_rel);
    }
    Ok(())
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
