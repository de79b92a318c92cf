use super::*;
use crate::history::HistoryRecord;
use crate::unit::MigrationUnit;
use std::path::PathBuf;

fn config() -> Config {
    serde_yaml::from_str("migration_dirs: [m]\n").unwrap()
}

fn unit(role: Role, version: Option<&str>) -> MigrationUnit {
    MigrationUnit {
        name: "o'brien patch".to_string(),
        role,
        version: version.map(String::from),
        script: "V1__o'brien_patch.sql".to_string(),
        path: PathBuf::from("V1__o'brien_patch.sql"),
        content: "select 1;".to_string(),
        hash: "abc123".to_string(),
        paired_up: None,
    }
}

#[test]
fn test_render_template_substitutes_all_slots() {
    let out = render_template("select '{a}', {b}", &[("a", "x"), ("b", "2")]).unwrap();
    assert_eq!(out, "select 'x', 2");
}

#[test]
fn test_render_template_rejects_unknown_slot() {
    let err = render_template("select {mystery}", &[("a", "x")]).unwrap_err();
    assert!(matches!(err, CoreError::UnknownTemplateSlot { .. }));
    assert!(err.to_string().contains("mystery"));
}

#[test]
fn test_escape_literal_doubles_quotes() {
    assert_eq!(escape_literal("o'brien"), "o''brien");
    assert_eq!(escape_literal("'; drop table x; --"), "''; drop table x; --");
}

#[test]
fn test_validate_ident() {
    assert!(validate_ident("schema_history").is_ok());
    assert!(validate_ident("_private").is_ok());
    assert!(validate_ident("bad-name").is_err());
    assert!(validate_ident("1starts_with_digit").is_err());
    assert!(validate_ident("a; drop table").is_err());
}

#[test]
fn test_create_table_sql_lists_all_role_codes() {
    let sql = create_history_table_sql(&config()).unwrap();
    assert!(sql.contains("create table public.schema_history"));
    assert!(sql.contains("primary key (name, type)"));
    for code in Role::all_codes() {
        assert!(sql.contains(&format!("'{code}'")), "missing code {code}");
    }
}

#[test]
fn test_history_query_and_exists_sql() {
    let config = config();
    assert_eq!(
        history_query_sql(&config).unwrap(),
        "select coalesce(json_agg(to_json(h)), '[]'::json) from public.schema_history h"
    );
    assert!(table_exists_sql(&config)
        .unwrap()
        .contains("table_name = 'schema_history'"));
}

#[test]
fn test_upsert_escapes_values_and_keys_on_name_type() {
    let sql = upsert_history_sql(&config(), &unit(Role::Up, Some("1")), "(x)").unwrap();
    assert!(sql.contains("'o''brien patch'"));
    assert!(sql.contains("'V1__o''brien_patch.sql'"));
    assert!(sql.contains("'U'"));
    assert!(sql.contains("'1'"));
    assert!(sql.contains("on conflict (name, type)"));
    assert!(sql.contains("current_user, (x)"));
    assert!(!sql.contains('{'));
}

#[test]
fn test_upsert_null_version_for_repeatable() {
    let sql = upsert_history_sql(&config(), &unit(Role::Repeatable, None), "(x)").unwrap();
    assert!(sql.contains("'R', null,"));
}

#[test]
fn test_delete_uses_paired_name_when_known() {
    let mut down = unit(Role::Down, Some("1"));
    down.paired_up = Some(HistoryRecord {
        rank: None,
        name: "initial schema".to_string(),
        role: Role::Up,
        version: Some("1".to_string()),
        script: "V1__initial_schema.sql".to_string(),
        hash: "h".to_string(),
        installed_by: String::new(),
        installed_on: String::new(),
        execution_time: String::new(),
    });
    let sql = delete_paired_up_sql(&config(), &down).unwrap();
    assert_eq!(
        sql,
        "delete from public.schema_history where name = 'initial schema' and type = 'U';"
    );
}

#[test]
fn test_delete_falls_back_to_version_in_full_mode() {
    let sql = delete_paired_up_sql(&config(), &unit(Role::Down, Some("7"))).unwrap();
    assert_eq!(
        sql,
        "delete from public.schema_history where version = '7' and type = 'U';"
    );
}

#[test]
fn test_update_ranks_uses_role_priorities() {
    let sql = update_ranks_sql(&config()).unwrap();
    assert!(sql.contains("when type = 'B' then 1"));
    assert!(sql.contains("when type = 'P' then 2"));
    assert!(sql.contains("when type = 'U' then 3"));
    assert!(sql.contains("when type = 'R' then 4"));
    assert!(sql.contains("when type = 'A' then 5"));
    assert!(sql.contains("else 6"));
    assert!(sql.contains("update public.schema_history as h"));
    assert!(sql.contains("where h.name = t.name and h.type = t.type;"));
}

#[test]
fn test_bad_ledger_identifiers_are_rejected() {
    let mut config = config();
    config.history_table_schema = "public; drop table users".to_string();
    assert!(matches!(
        history_query_sql(&config),
        Err(CoreError::InvalidIdentifier { .. })
    ));
}
