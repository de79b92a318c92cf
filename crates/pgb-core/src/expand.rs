//! Textual pre-processing of unit content.
//!
//! Two passes run before hashing: `-- !include <path>` directives inline
//! the referenced file at the marked line (recursively, cycle-checked),
//! and `${VAR}` placeholders are substituted from the process
//! environment. Hashes are always computed over the expanded text.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*--\s*!include\s+(.+?)\s*$").expect("static regex"))
}

fn var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex"))
}

/// Read a unit's content and apply the configured pre-processing passes.
///
/// Non-fatal anomalies (unset variables) are pushed onto `warnings`.
pub fn load_content(path: &Path, config: &Config, warnings: &mut Vec<String>) -> CoreResult<String> {
    let raw = read_file(path)?;
    let expanded = if config.expand_includes {
        let mut stack = vec![normalize_for_cycle_check(path)];
        expand_includes(&raw, path, &mut stack)?
    } else {
        raw
    };
    if config.env_substitution {
        Ok(substitute_env(&expanded, path, warnings))
    } else {
        Ok(expanded)
    }
}

/// Inline `-- !include <path>` directives, depth-first.
fn expand_includes(content: &str, from: &Path, stack: &mut Vec<PathBuf>) -> CoreResult<String> {
    let base = from.parent().unwrap_or_else(|| Path::new("."));
    let mut out = String::with_capacity(content.len());

    for line in content.lines() {
        let Some(caps) = include_re().captures(line) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };
        let target = base.join(&caps[1]);
        if !target.is_file() {
            return Err(CoreError::IncludeNotFound {
                script: from.display().to_string(),
                include: caps[1].to_string(),
            });
        }
        let key = normalize_for_cycle_check(&target);
        if stack.contains(&key) {
            let mut cycle: Vec<String> = stack.iter().map(|p| p.display().to_string()).collect();
            cycle.push(key.display().to_string());
            return Err(CoreError::IncludeCycle {
                cycle: cycle.join(" -> "),
            });
        }
        stack.push(key);
        let nested = read_file(&target)?;
        out.push_str(&expand_includes(&nested, &target, stack)?);
        stack.pop();
    }

    Ok(out)
}

/// Replace `${VAR}` placeholders from the environment.
///
/// Unset variables stay verbatim; substituting an empty string would
/// silently corrupt the generated SQL.
fn substitute_env(content: &str, path: &Path, warnings: &mut Vec<String>) -> String {
    var_re()
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            match std::env::var(name) {
                Ok(value) => value,
                Err(_) => {
                    warnings.push(format!(
                        "Environment variable {} is not set; left verbatim in {}",
                        name,
                        path.display()
                    ));
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

fn read_file(path: &Path) -> CoreResult<String> {
    std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
        path: path.display().to_string(),
        source: e,
    })
}

/// Canonicalize when possible so symlinked self-includes are still caught.
fn normalize_for_cycle_check(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
#[path = "expand_test.rs"]
mod tests;
