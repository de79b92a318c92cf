use super::*;
use crate::history::HistoryRecord;
use std::path::PathBuf;

fn unit(name: &str, role: Role, version: Option<&str>, script: &str, hash: &str) -> MigrationUnit {
    MigrationUnit {
        name: name.to_string(),
        role,
        version: version.map(String::from),
        script: script.to_string(),
        path: PathBuf::from(script),
        content: String::new(),
        hash: hash.to_string(),
        paired_up: None,
    }
}

fn applied(name: &str, role: Role, version: Option<&str>, script: &str, hash: &str) -> HistoryRecord {
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
fn test_new_up_unit_is_accepted() {
    let index = HistoryIndex::build(&[]);
    let mut reconciler = Reconciler::new(&index, false);
    let mut u = unit("init", Role::Up, Some("1"), "V1__init.sql", "h1");
    assert_eq!(reconciler.admit(&mut u).unwrap(), Admission::Accepted);
}

#[test]
fn test_recorded_up_version_is_silently_rejected() {
    let index = HistoryIndex::build(&[applied("init", Role::Up, Some("1"), "V1__init.sql", "h1")]);
    let mut reconciler = Reconciler::new(&index, false);
    let mut u = unit("init", Role::Up, Some("1"), "V1__init.sql", "h1");
    assert_eq!(reconciler.admit(&mut u).unwrap(), Admission::AlreadyApplied);
}

#[test]
fn test_duplicate_discovered_up_versions_are_fatal() {
    let index = HistoryIndex::build(&[]);
    let mut reconciler = Reconciler::new(&index, false);
    let mut a = unit("init", Role::Up, Some("3"), "V3__a.sql", "ha");
    let mut b = unit("other", Role::Up, Some("3"), "V3__b.sql", "hb");

    assert_eq!(reconciler.admit(&mut a).unwrap(), Admission::Accepted);
    let err = reconciler.admit(&mut b).unwrap_err();
    assert!(matches!(err, CoreError::DuplicateVersion { .. }));
    assert!(err.to_string().contains("V3__a.sql"));
}

#[test]
fn test_duplicate_is_fatal_even_when_version_already_applied() {
    let index = HistoryIndex::build(&[applied("init", Role::Up, Some("3"), "V3__a.sql", "h")]);
    let mut reconciler = Reconciler::new(&index, false);
    let mut a = unit("init", Role::Up, Some("3"), "V3__a.sql", "h");
    let mut b = unit("other", Role::Up, Some("3"), "V3__b.sql", "h2");

    assert_eq!(reconciler.admit(&mut a).unwrap(), Admission::AlreadyApplied);
    assert!(reconciler.admit(&mut b).is_err());
}

#[test]
fn test_down_requires_applied_up() {
    let index = HistoryIndex::build(&[applied("init", Role::Up, Some("1"), "V1__init.sql", "h")]);
    let mut reconciler = Reconciler::new(&index, false);

    let mut ok = unit("init", Role::Down, Some("1"), "U1__init.sql", "hd");
    assert_eq!(reconciler.admit(&mut ok).unwrap(), Admission::Accepted);
    assert_eq!(ok.paired_up.as_ref().unwrap().name, "init");

    let mut missing = unit("later", Role::Down, Some("2"), "U2__later.sql", "hd2");
    assert_eq!(
        reconciler.admit(&mut missing).unwrap(),
        Admission::NoMatchingUp
    );
    assert!(missing.paired_up.is_none());
}

#[test]
fn test_duplicate_down_versions_are_fatal() {
    let index = HistoryIndex::build(&[]);
    let mut reconciler = Reconciler::new(&index, false);
    let mut a = unit("a", Role::Down, Some("2"), "U2__a.sql", "ha");
    let mut b = unit("b", Role::Down, Some("2"), "U2__b.sql", "hb");

    // Not applied, so the first is rejected — but the duplicate is still fatal.
    assert_eq!(reconciler.admit(&mut a).unwrap(), Admission::NoMatchingUp);
    assert!(reconciler.admit(&mut b).is_err());
}

#[test]
fn test_repeatable_is_content_addressed() {
    let index = HistoryIndex::build(&[applied(
        "view",
        Role::Repeatable,
        None,
        "R__view.sql",
        "same-hash",
    )]);
    let mut reconciler = Reconciler::new(&index, false);

    let mut unchanged = unit("view", Role::Repeatable, None, "R__view.sql", "same-hash");
    assert_eq!(
        reconciler.admit(&mut unchanged).unwrap(),
        Admission::AlreadyApplied
    );

    let mut changed = unit("view", Role::Repeatable, None, "R__view.sql", "new-hash");
    assert_eq!(reconciler.admit(&mut changed).unwrap(), Admission::Accepted);

    // Same content under a different script identity re-applies.
    let mut moved = unit("view", Role::Repeatable, None, "other/R__view.sql", "same-hash");
    assert_eq!(reconciler.admit(&mut moved).unwrap(), Admission::Accepted);
}

#[test]
fn test_before_after_finalize_always_accepted() {
    let index = HistoryIndex::build(&[applied("prep", Role::Before, None, "before__prep.sql", "h")]);
    let mut reconciler = Reconciler::new(&index, false);

    for role in [Role::Before, Role::After, Role::Finalize] {
        let mut u = unit("prep", role, None, "before__prep.sql", "h");
        assert_eq!(reconciler.admit(&mut u).unwrap(), Admission::Accepted);
    }
}

#[test]
fn test_full_mode_bypasses_history_but_not_duplicates() {
    let index = HistoryIndex::build(&[
        applied("init", Role::Up, Some("1"), "V1__init.sql", "h"),
        applied("view", Role::Repeatable, None, "R__view.sql", "rh"),
    ]);
    let mut reconciler = Reconciler::new(&index, true);

    let mut up = unit("init", Role::Up, Some("1"), "V1__init.sql", "h");
    assert_eq!(reconciler.admit(&mut up).unwrap(), Admission::Accepted);

    let mut rep = unit("view", Role::Repeatable, None, "R__view.sql", "rh");
    assert_eq!(reconciler.admit(&mut rep).unwrap(), Admission::Accepted);

    let mut down = unit("init", Role::Down, Some("9"), "U9__x.sql", "dh");
    assert_eq!(reconciler.admit(&mut down).unwrap(), Admission::Accepted);

    let mut dup = unit("again", Role::Up, Some("1"), "V1__again.sql", "h2");
    assert!(reconciler.admit(&mut dup).is_err());
}
