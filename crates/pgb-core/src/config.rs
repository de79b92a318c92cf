//! Configuration types and parsing for pgbatch.yml

use crate::checksum::HashAlgorithm;
use crate::error::{CoreError, CoreResult};
use crate::role::Role;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration from pgbatch.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database connection parameters passed to the external client
    #[serde(default)]
    pub connection: ConnectionConfig,

    /// Path or name of the psql executable
    #[serde(default = "default_psql")]
    pub psql: String,

    /// Path or name of the pg_dump executable
    #[serde(default = "default_pg_dump")]
    pub pg_dump: String,

    /// Extra arguments appended to every schema dump
    #[serde(default = "default_dump_args")]
    pub schema_dump_additional_args: Vec<String>,

    /// Source roots contributing units of any role (prefix decides)
    #[serde(default)]
    pub migration_dirs: Vec<String>,

    /// Roots whose files are all Up units
    #[serde(default)]
    pub up_dirs: Vec<String>,

    /// Roots whose files are all Down units
    #[serde(default)]
    pub down_dirs: Vec<String>,

    /// Roots whose files are all Repeatable units
    #[serde(default)]
    pub repeatable_dirs: Vec<String>,

    /// Roots whose files are all RepeatableBefore units
    #[serde(default)]
    pub repeatable_before_dirs: Vec<String>,

    /// Roots whose files are all Before units
    #[serde(default)]
    pub before_dirs: Vec<String>,

    /// Roots whose files are all After units
    #[serde(default)]
    pub after_dirs: Vec<String>,

    /// Roots whose files are all Finalize units
    #[serde(default)]
    pub finalize_dirs: Vec<String>,

    /// Expand every root into its subdirectories
    #[serde(default)]
    pub recursive_dirs: bool,

    /// Filename exclusion regex applied before classification
    #[serde(default)]
    pub skip_pattern: Option<String>,

    /// Prefix marking Up units; the remainder is the version
    #[serde(default = "default_up_prefix")]
    pub up_prefix: String,

    /// Prefix marking Down units; the remainder is the version
    #[serde(default = "default_down_prefix")]
    pub down_prefix: String,

    /// Exact prefix marking Repeatable units
    #[serde(default = "default_repeatable_prefix")]
    pub repeatable_prefix: String,

    /// Exact prefix marking RepeatableBefore units
    #[serde(default = "default_repeatable_before_prefix")]
    pub repeatable_before_prefix: String,

    /// Exact prefix marking Before units
    #[serde(default = "default_before_prefix")]
    pub before_prefix: String,

    /// Exact prefix marking After units
    #[serde(default = "default_after_prefix")]
    pub after_prefix: String,

    /// Exact prefix marking Finalize units
    #[serde(default = "default_finalize_prefix")]
    pub finalize_prefix: String,

    /// Delimiter between the role prefix and the display-name segment
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Accepted file extensions (lowercase, no dot)
    #[serde(default = "default_extensions")]
    pub migration_extensions: Vec<String>,

    /// Order non-versioned buckets by source path instead of display name
    #[serde(default)]
    pub sort_by_path: bool,

    /// Content fingerprint algorithm
    #[serde(default)]
    pub hash_algorithm: HashAlgorithm,

    /// Ledger table name
    #[serde(default = "default_history_table_name")]
    pub history_table_name: String,

    /// Ledger schema namespace
    #[serde(default = "default_history_table_schema")]
    pub history_table_schema: String,

    /// Scratch directory for assembled script artifacts
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: String,

    /// Keep prior artifacts instead of clearing the scratch directory
    #[serde(default)]
    pub keep_migration_dir_history: bool,

    /// Wrap the batch in a plpgsql DO block (false: plain transaction)
    #[serde(default = "default_true")]
    pub use_procedural_script: bool,

    /// Expand `-- !include <path>` directives in unit content
    #[serde(default = "default_true")]
    pub expand_includes: bool,

    /// Substitute `${VAR}` placeholders from the process environment
    #[serde(default)]
    pub env_substitution: bool,

    /// Verbose output (also settable per invocation with --verbose)
    #[serde(default)]
    pub verbose: bool,

    /// Env-file merging: false, true (.env), or an explicit path
    #[serde(default)]
    pub env: EnvFile,
}

/// Connection parameters forwarded to psql / pg_dump
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConnectionConfig {
    /// Database host
    #[serde(default)]
    pub host: Option<String>,

    /// Database port
    #[serde(default)]
    pub port: Option<String>,

    /// Database name
    #[serde(default)]
    pub dbname: Option<String>,

    /// Database user
    #[serde(default)]
    pub username: Option<String>,

    /// Password, exported as PGPASSWORD to the child process
    #[serde(default)]
    pub password: Option<String>,
}

/// Env-file setting: disabled, default `.env`, or an explicit path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvFile {
    /// true enables the default `.env` lookup
    Enabled(bool),
    /// Explicit path relative to the project root
    Path(String),
}

impl Default for EnvFile {
    fn default() -> Self {
        EnvFile::Enabled(false)
    }
}

fn default_psql() -> String {
    "psql".to_string()
}

fn default_pg_dump() -> String {
    "pg_dump".to_string()
}

fn default_dump_args() -> Vec<String> {
    vec!["--no-owner".to_string(), "--no-acl".to_string()]
}

fn default_up_prefix() -> String {
    "V".to_string()
}

fn default_down_prefix() -> String {
    "U".to_string()
}

fn default_repeatable_prefix() -> String {
    "R".to_string()
}

fn default_repeatable_before_prefix() -> String {
    "R_before".to_string()
}

fn default_before_prefix() -> String {
    "before".to_string()
}

fn default_after_prefix() -> String {
    "after".to_string()
}

fn default_finalize_prefix() -> String {
    "finalize".to_string()
}

fn default_separator() -> String {
    "__".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["sql".to_string()]
}

fn default_history_table_name() -> String {
    "schema_history".to_string()
}

fn default_history_table_schema() -> String {
    "public".to_string()
}

fn default_tmp_dir() -> String {
    "tmp".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory.
    /// Looks for pgbatch.yml or pgbatch.yaml.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("pgbatch.yml");
        let yaml_path = dir.join("pgbatch.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.separator.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "separator cannot be empty".to_string(),
            });
        }
        if self.history_table_name.is_empty() || self.history_table_schema.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "history_table_name and history_table_schema are required".to_string(),
            });
        }
        if self.tmp_dir.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "tmp_dir is required".to_string(),
            });
        }
        if self.migration_extensions.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migration_extensions must list at least one extension".to_string(),
            });
        }
        if !self.has_source_roots() {
            return Err(CoreError::ConfigInvalid {
                message: "at least one migration root must be configured \
                          (migration_dirs or a role-specific *_dirs entry)"
                    .to_string(),
            });
        }
        if let Some(pattern) = &self.skip_pattern {
            regex::Regex::new(pattern).map_err(|e| CoreError::ConfigInvalid {
                message: format!("skip_pattern is not a valid regex: {e}"),
            })?;
        }
        Ok(())
    }

    /// Whether any source root is configured
    pub fn has_source_roots(&self) -> bool {
        !self.migration_dirs.is_empty()
            || self.role_dirs().iter().any(|(_, dirs)| !dirs.is_empty())
    }

    /// Role-hinted root lists, paired with the role they contribute to
    pub fn role_dirs(&self) -> [(Role, &[String]); 7] {
        [
            (Role::Up, self.up_dirs.as_slice()),
            (Role::Down, self.down_dirs.as_slice()),
            (Role::Repeatable, self.repeatable_dirs.as_slice()),
            (
                Role::RepeatableBefore,
                self.repeatable_before_dirs.as_slice(),
            ),
            (Role::Before, self.before_dirs.as_slice()),
            (Role::After, self.after_dirs.as_slice()),
            (Role::Finalize, self.finalize_dirs.as_slice()),
        ]
    }

    /// Prefix marker for a role, paired with whether the marker is a
    /// starts-with match (versioned roles) or an exact match.
    pub fn prefix_for(&self, role: Role) -> (&str, bool) {
        match role {
            Role::Up => (&self.up_prefix, true),
            Role::Down => (&self.down_prefix, true),
            Role::Repeatable => (&self.repeatable_prefix, false),
            Role::RepeatableBefore => (&self.repeatable_before_prefix, false),
            Role::Before => (&self.before_prefix, false),
            Role::After => (&self.after_prefix, false),
            Role::Finalize => (&self.finalize_prefix, false),
        }
    }

    /// Whether a file extension (lowercase, no dot) is accepted
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.migration_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Get the absolute scratch directory relative to a project root
    pub fn tmp_dir_absolute(&self, root: &Path) -> PathBuf {
        let p = Path::new(&self.tmp_dir);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            root.join(p)
        }
    }

    /// Merge connection overrides from an env file, if configured.
    ///
    /// Missing file is a warning, not an error; unknown keys are ignored.
    pub fn apply_env_file(&mut self, root: &Path) -> CoreResult<()> {
        let rel = match &self.env {
            EnvFile::Enabled(false) => return Ok(()),
            EnvFile::Enabled(true) => ".env".to_string(),
            EnvFile::Path(p) => p.clone(),
        };
        let path = root.join(&rel);
        if !path.is_file() {
            log::warn!("Env file not found: {} — skipping env import", path.display());
            return Ok(());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let mut value = value.trim();
            if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
                value = &value[1..value.len() - 1];
            }
            match connection_field_for_alias(&key) {
                Some(ConnectionField::Host) => self.connection.host = Some(value.to_string()),
                Some(ConnectionField::Port) => self.connection.port = Some(value.to_string()),
                Some(ConnectionField::Dbname) => self.connection.dbname = Some(value.to_string()),
                Some(ConnectionField::Username) => {
                    self.connection.username = Some(value.to_string())
                }
                Some(ConnectionField::Password) => {
                    self.connection.password = Some(value.to_string())
                }
                None => {}
            }
        }
        Ok(())
    }
}

enum ConnectionField {
    Host,
    Port,
    Dbname,
    Username,
    Password,
}

/// Map common PostgreSQL env-file key spellings onto connection fields
fn connection_field_for_alias(key: &str) -> Option<ConnectionField> {
    match key {
        "host" | "pghost" | "pg_host" | "postgres_host" | "db_host" | "dbhost" => {
            Some(ConnectionField::Host)
        }
        "port" | "pgport" | "pg_port" | "postgres_port" | "db_port" => Some(ConnectionField::Port),
        "dbname" | "db" | "db_name" | "database" | "pgdatabase" | "pg_database" | "pg_dbname"
        | "postgres_db" | "postgres_database" => Some(ConnectionField::Dbname),
        "username" | "user" | "pguser" | "pg_user" | "postgres_user" | "db_user" | "db_username" => {
            Some(ConnectionField::Username)
        }
        "password" | "pass" | "pgpassword" | "pg_password" | "postgres_password" | "db_password"
        | "db_pass" => Some(ConnectionField::Password),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
