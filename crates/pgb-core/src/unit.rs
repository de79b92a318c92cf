//! Migration unit classification.
//!
//! Turns one discovered file into a classified unit: role, extracted
//! version, display name, stable script identity, and content hash.
//! Skips are reported through the scan context, never fatal; the only
//! fatal outcome at this stage is an unreadable file.

use crate::checksum::compute_checksum;
use crate::config::Config;
use crate::error::CoreResult;
use crate::expand::load_content;
use crate::history::HistoryRecord;
use crate::plan::Direction;
use crate::role::{Role, PREFIX_PRIORITY};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One discovered, classified migration artifact
#[derive(Debug, Clone)]
pub struct MigrationUnit {
    /// Display name, unique per role within a plan
    pub name: String,
    /// Functional category
    pub role: Role,
    /// Extracted version (Up/Down only)
    pub version: Option<String>,
    /// Stable path-derived ledger identity
    pub script: String,
    /// Source file location
    pub path: PathBuf,
    /// Post-expansion content
    pub content: String,
    /// Content fingerprint over the post-expansion text
    pub hash: String,
    /// For an accepted Down unit, the applied Up record it removes
    pub paired_up: Option<HistoryRecord>,
}

/// A configured source root, optionally pinned to one role
#[derive(Debug, Clone)]
pub struct SourceRoot {
    /// Resolved directory
    pub path: PathBuf,
    /// The root string as configured, used in script identities
    pub configured: String,
    /// Directory-role hint; overrides prefix matching
    pub role_hint: Option<Role>,
}

/// Classification outcome for one file
#[derive(Debug)]
pub enum Classified {
    /// A usable unit
    Unit(MigrationUnit),
    /// Skipped, with the reason recorded
    Skip(SkipReason),
}

/// Why a file was not classified into a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Extension not in the configured set
    Extension,
    /// No separator and no directory-role hint
    MissingSeparator,
    /// Prefix matched no configured role marker
    UnmatchedPrefix,
    /// Versioned role with an empty version
    EmptyVersion,
    /// Role not active for the requested direction
    InactiveDirection,
}

/// Per-invocation scan accumulator.
///
/// Owns everything the classifier must remember across files: claimed
/// display names per role and collected warnings. Passed explicitly
/// through the planning pass instead of living in ambient state.
#[derive(Debug)]
pub struct ScanContext {
    /// More than one source root is configured
    pub multi_source: bool,
    /// Non-fatal diagnostics, surfaced at the end of planning
    pub warnings: Vec<String>,
    used_names: HashSet<(char, String)>,
}

impl ScanContext {
    pub fn new(multi_source: bool) -> Self {
        Self {
            multi_source,
            warnings: Vec::new(),
            used_names: HashSet::new(),
        }
    }

    fn warn(&mut self, message: String) {
        log::warn!("{message}");
        self.warnings.push(message);
    }

    /// Claim a display name for a role, disambiguating on collision.
    ///
    /// Collisions first try suffixes built from the source directory's
    /// trailing path segments (most-specific first), then fall back to a
    /// numeric counter.
    pub fn claim_name(&mut self, role: Role, base: &str, source_dir: &Path) -> String {
        if self.try_claim(role, base) {
            return base.to_string();
        }

        let segments: Vec<String> = source_dir
            .components()
            .filter_map(|c| match c {
                std::path::Component::Normal(s) => s.to_str().map(normalize_name),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect();

        for depth in 1..=segments.len() {
            let suffix = segments[segments.len() - depth..].join(" ");
            let candidate = format!("{base} {suffix}");
            if self.try_claim(role, &candidate) {
                return candidate;
            }
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{base} ({counter})");
            if self.try_claim(role, &candidate) {
                return candidate;
            }
            counter += 1;
        }
    }

    fn try_claim(&mut self, role: Role, name: &str) -> bool {
        self.used_names.insert((role.code(), name.to_string()))
    }
}

/// Normalize a filename segment into a display name: non-alphanumeric
/// runs collapse to single spaces.
pub fn normalize_name(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut pending_space = false;
    for ch in segment.chars() {
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else {
            pending_space = true;
        }
    }
    out
}

/// Classify one file from a source root.
///
/// `rel_path` is the file's path relative to `root`, which keeps script
/// identities stable under recursive discovery.
pub fn classify(
    rel_path: &Path,
    root: &SourceRoot,
    direction: Direction,
    config: &Config,
    ctx: &mut ScanContext,
) -> CoreResult<Classified> {
    let path = root.path.join(rel_path);
    let file_name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.to_string(),
        None => return Ok(Classified::Skip(SkipReason::Extension)),
    };

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !config.accepts_extension(extension) {
        ctx.warn(format!(
            "Migration file {} does not match accepted extensions ({}). Skipping.",
            path.display(),
            config.migration_extensions.join(", ")
        ));
        return Ok(Classified::Skip(SkipReason::Extension));
    }

    let (prefix, suffix) = match file_name.split_once(config.separator.as_str()) {
        Some((p, s)) => (p.to_string(), s.to_string()),
        None => {
            if root.role_hint.is_none() {
                ctx.warn(format!(
                    "Migration file {} does not contain separator '{}'. Skipping.",
                    path.display(),
                    config.separator
                ));
                return Ok(Classified::Skip(SkipReason::MissingSeparator));
            }
            // Hinted directory: the whole filename is the name segment.
            (String::new(), file_name.clone())
        }
    };

    let role = match root.role_hint {
        Some(role) => role,
        None => match resolve_role_from_prefix(&prefix, config) {
            Some(role) => role,
            None => {
                ctx.warn(format!(
                    "Migration file {} does not contain a valid role prefix. Skipping.",
                    path.display()
                ));
                return Ok(Classified::Skip(SkipReason::UnmatchedPrefix));
            }
        },
    };

    if !direction.includes(role) {
        return Ok(Classified::Skip(SkipReason::InactiveDirection));
    }

    let version = if role.is_versioned() {
        let (marker, _) = config.prefix_for(role);
        let raw = prefix.strip_prefix(marker).unwrap_or(&prefix).trim();
        if raw.is_empty() {
            ctx.warn(format!(
                "Migration file {} does not contain a version. Skipping.",
                path.display()
            ));
            return Ok(Classified::Skip(SkipReason::EmptyVersion));
        }
        Some(raw.to_string())
    } else {
        None
    };

    let name = normalize_name(strip_extension(&suffix));
    let content = load_content(&path, config, &mut ctx.warnings)?;
    let hash = compute_checksum(config.hash_algorithm, &content);
    let script = script_identity(root, rel_path, ctx.multi_source);

    Ok(Classified::Unit(MigrationUnit {
        name,
        role,
        version,
        script,
        path,
        content,
        hash,
        paired_up: None,
    }))
}

/// Match a filename prefix against the configured role markers, in the
/// fixed priority order: Up, Down, Repeatable, RepeatableBefore, Before,
/// After, Finalize. Versioned markers match by prefix, others exactly.
fn resolve_role_from_prefix(prefix: &str, config: &Config) -> Option<Role> {
    for role in PREFIX_PRIORITY {
        let (marker, starts_with) = config.prefix_for(role);
        if marker.is_empty() {
            continue;
        }
        let matched = if starts_with {
            prefix.starts_with(marker)
        } else {
            prefix == marker
        };
        if matched {
            return Some(role);
        }
    }
    None
}

/// Drop the final `.ext` segment of the name part, keeping interior dots
fn strip_extension(suffix: &str) -> &str {
    match suffix.rfind('.') {
        Some(idx) => &suffix[..idx],
        None => suffix,
    }
}

/// Stable ledger identity for a source file.
///
/// Single-root scans use the root-relative path; multi-root scans prefix
/// the configured root string so identical filenames in different roots
/// stay distinct.
fn script_identity(root: &SourceRoot, rel_path: &Path, multi_source: bool) -> String {
    let rel = path_to_slashes(rel_path);
    if multi_source {
        let base = root.configured.trim_end_matches('/');
        format!("{base}/{rel}")
    } else {
        rel
    }
}

fn path_to_slashes(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[path = "unit_test.rs"]
mod tests;
