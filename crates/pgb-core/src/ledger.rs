//! Ledger SQL generation.
//!
//! All SQL destined for the history table goes through one closed-slot
//! template renderer: identifiers are validated against a strict
//! pattern and every value is escaped as a SQL string literal before it
//! reaches a template, so configuration values can never smuggle
//! statements into the generated script.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::role::Role;
use crate::unit::MigrationUnit;
use regex::Regex;
use std::sync::OnceLock;

const CREATE_HISTORY_TABLE: &str = "\
do $$
begin
    if exists(select 1 from information_schema.schemata where schema_name = '{schema}') is false then
        raise info 'create schema %;', '{schema}';
        create schema {schema};
    end if;

    if exists(select 1 from information_schema.tables where table_schema = '{schema}' and table_name = '{table}') is false then
        raise info 'create table %.%;', '{schema}', '{table}';
        create table {schema}.{table}
        (
            rank int,
            name text not null,
            type char not null check (type in ({types})),
            version text,
            script text not null,
            hash text not null,
            installed_by text not null,
            installed_on timestamp with time zone not null default now(),
            execution_time interval not null,
            primary key (name, type)
        );
    end if;
end;
$$;";

const TABLE_EXISTS: &str = "select exists(select 1 from information_schema.tables \
where table_schema = '{schema}' and table_name = '{table}')";

const HISTORY_QUERY: &str =
    "select coalesce(json_agg(to_json(h)), '[]'::json) from {schema}.{table} h";

const UPSERT_HISTORY: &str = "\
insert into {schema}.{table} (name, type, version, script, hash, installed_by, execution_time)
values ('{name}', '{type}', {version}, '{script}', '{hash}', current_user, {elapsed})
on conflict (name, type) do update set
    version = {version},
    script = '{script}',
    hash = '{hash}',
    installed_by = current_user,
    installed_on = now(),
    execution_time = {elapsed};";

const DELETE_PAIRED_UP: &str =
    "delete from {schema}.{table} where name = '{name}' and type = '{type}';";

const DELETE_UP_BY_VERSION: &str =
    "delete from {schema}.{table} where version = '{version}' and type = '{type}';";

const UPDATE_RANKS: &str = "\
update {schema}.{table} as h
set rank = t.rank
from (
    select name, type, row_number() over (order by
        {rank_case},
        version,
        name) as rank
    from {schema}.{table}
    ) as t
where h.name = t.name and h.type = t.type;";

fn slot_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("static regex"))
}

/// Render a SQL template from a closed set of named slots.
///
/// Every slot referenced by the template must be provided; an unknown
/// reference is an error rather than a silently emitted placeholder.
pub fn render_template(template: &str, slots: &[(&str, &str)]) -> CoreResult<String> {
    let mut missing = None;
    let out = slot_re().replace_all(template, |caps: &regex::Captures<'_>| {
        let key = &caps[1];
        match slots.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => (*value).to_string(),
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });
    match missing {
        Some(slot) => Err(CoreError::UnknownTemplateSlot { slot }),
        None => Ok(out.into_owned()),
    }
}

/// Escape a value for inclusion inside a single-quoted SQL literal
pub fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Validate a schema or table name against a strict identifier pattern
pub fn validate_ident(ident: &str) -> CoreResult<&str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"));
    if re.is_match(ident) {
        Ok(ident)
    } else {
        Err(CoreError::InvalidIdentifier {
            ident: ident.to_string(),
        })
    }
}

/// The rank CASE expression, generated from the role set
fn rank_case_sql() -> String {
    let mut out = String::from("case\n");
    for role in [
        Role::Before,
        Role::RepeatableBefore,
        Role::Up,
        Role::Repeatable,
        Role::After,
    ] {
        out.push_str(&format!(
            "            when type = '{}' then {}\n",
            role.code(),
            role.rank()
        ));
    }
    out.push_str("            else 6\n        end");
    out
}

fn ledger_slots(config: &Config) -> CoreResult<[(&'static str, String); 2]> {
    Ok([
        (
            "schema",
            validate_ident(&config.history_table_schema)?.to_string(),
        ),
        (
            "table",
            validate_ident(&config.history_table_name)?.to_string(),
        ),
    ])
}

fn with_ledger_slots<'a>(
    base: &'a [(&'static str, String)],
    extra: &'a [(&'static str, String)],
) -> Vec<(&'a str, &'a str)> {
    base.iter()
        .chain(extra.iter())
        .map(|(k, v)| (*k, v.as_str()))
        .collect()
}

/// Idempotent create-schema/create-table block for the ledger
pub fn create_history_table_sql(config: &Config) -> CoreResult<String> {
    let base = ledger_slots(config)?;
    let types = Role::all_codes()
        .iter()
        .map(|c| format!("'{c}'"))
        .collect::<Vec<_>>()
        .join(",");
    let extra = [("types", types)];
    render_template(CREATE_HISTORY_TABLE, &with_ledger_slots(&base, &extra))
}

/// Existence probe for the ledger table
pub fn table_exists_sql(config: &Config) -> CoreResult<String> {
    let base = ledger_slots(config)?;
    render_template(TABLE_EXISTS, &with_ledger_slots(&base, &[]))
}

/// Snapshot query returning the full ledger as one JSON document
pub fn history_query_sql(config: &Config) -> CoreResult<String> {
    let base = ledger_slots(config)?;
    render_template(HISTORY_QUERY, &with_ledger_slots(&base, &[]))
}

/// Bookkeeping upsert for one applied unit.
///
/// `elapsed` is the SQL expression producing the execution interval; it
/// differs between the procedural and plain wrapper styles.
pub fn upsert_history_sql(
    config: &Config,
    unit: &MigrationUnit,
    elapsed: &str,
) -> CoreResult<String> {
    let base = ledger_slots(config)?;
    let version = match &unit.version {
        Some(v) => format!("'{}'", escape_literal(v)),
        None => "null".to_string(),
    };
    let extra = [
        ("name", escape_literal(&unit.name)),
        ("type", unit.role.code().to_string()),
        ("version", version),
        ("script", escape_literal(&unit.script)),
        ("hash", escape_literal(&unit.hash)),
        ("elapsed", elapsed.to_string()),
    ];
    render_template(UPSERT_HISTORY, &with_ledger_slots(&base, &extra))
}

/// Ledger deletion for an applied Down unit.
///
/// Deletes the paired Up record by name when the pairing is known
/// (normal gating), by version in full mode where history was not read.
pub fn delete_paired_up_sql(config: &Config, unit: &MigrationUnit) -> CoreResult<String> {
    let base = ledger_slots(config)?;
    match &unit.paired_up {
        Some(applied) => {
            let extra = [
                ("name", escape_literal(&applied.name)),
                ("type", Role::Up.code().to_string()),
            ];
            render_template(DELETE_PAIRED_UP, &with_ledger_slots(&base, &extra))
        }
        None => {
            let version = unit.version.clone().unwrap_or_default();
            let extra = [
                ("version", escape_literal(&version)),
                ("type", Role::Up.code().to_string()),
            ];
            render_template(DELETE_UP_BY_VERSION, &with_ledger_slots(&base, &extra))
        }
    }
}

/// Rank-recompute statement, run once at the end of every batch
pub fn update_ranks_sql(config: &Config) -> CoreResult<String> {
    let base = ledger_slots(config)?;
    let extra = [("rank_case", rank_case_sql())];
    render_template(UPDATE_RANKS, &with_ledger_slots(&base, &extra))
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
