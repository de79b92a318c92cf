use super::*;

fn record(name: &str, role: Role, version: Option<&str>, script: &str, hash: &str) -> HistoryRecord {
    HistoryRecord {
        rank: None,
        name: name.to_string(),
        role,
        version: version.map(String::from),
        script: script.to_string(),
        hash: hash.to_string(),
        installed_by: "postgres".to_string(),
        installed_on: String::new(),
        execution_time: String::new(),
    }
}

#[test]
fn test_parse_snapshot_from_psql_json() {
    let json = r#"[
        {"rank": 1, "name": "init", "type": "U", "version": "1",
         "script": "V1__init.sql", "hash": "abc",
         "installed_by": "postgres",
         "installed_on": "2026-01-01T10:00:00+00:00",
         "execution_time": "00:00:00.1234"},
        {"rank": 2, "name": "view", "type": "R", "version": null,
         "script": "R__view.sql", "hash": "def",
         "installed_by": "postgres",
         "installed_on": "2026-01-01T10:00:01+00:00",
         "execution_time": "00:00:00.01"}
    ]"#;
    let records = parse_history_snapshot(json).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].role, Role::Up);
    assert_eq!(records[0].version.as_deref(), Some("1"));
    assert_eq!(records[1].role, Role::Repeatable);
    assert!(records[1].version.is_none());
}

#[test]
fn test_parse_empty_payload_is_empty_history() {
    assert!(parse_history_snapshot("").unwrap().is_empty());
    assert!(parse_history_snapshot("  \n").unwrap().is_empty());
    assert!(parse_history_snapshot("[]").unwrap().is_empty());
}

#[test]
fn test_parse_garbage_is_an_error() {
    assert!(matches!(
        parse_history_snapshot("not json"),
        Err(CoreError::HistorySnapshot { .. })
    ));
}

#[test]
fn test_index_keys_repeatable_by_hash_and_script() {
    let records = vec![
        record("view", Role::Repeatable, None, "R__view.sql", "h1"),
        record("seed", Role::RepeatableBefore, None, "R_before__seed.sql", "h2"),
        record("init", Role::Up, Some("1"), "V1__init.sql", "h3"),
    ];
    let index = HistoryIndex::build(&records);

    assert!(index.has_repeatable("h1", "R__view.sql"));
    assert!(index.has_repeatable("h2", "R_before__seed.sql"));
    // Same script, changed content: not applied
    assert!(!index.has_repeatable("h1-changed", "R__view.sql"));
    // Up rows are not in the repeatable set
    assert!(!index.has_repeatable("h3", "V1__init.sql"));
}

#[test]
fn test_index_up_lookup() {
    let records = vec![record("init", Role::Up, Some("1"), "V1__init.sql", "h")];
    let index = HistoryIndex::build(&records);
    assert_eq!(index.applied_up("1").unwrap().name, "init");
    assert!(index.applied_up("2").is_none());
}
