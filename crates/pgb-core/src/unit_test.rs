use super::*;
use crate::plan::Direction;

fn config() -> Config {
    serde_yaml::from_str("migration_dirs: [migrations]\n").unwrap()
}

fn root_at(dir: &Path, hint: Option<Role>) -> SourceRoot {
    SourceRoot {
        path: dir.to_path_buf(),
        configured: "migrations".to_string(),
        role_hint: hint,
    }
}

fn write_unit(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn classify_one(
    dir: &Path,
    file: &str,
    hint: Option<Role>,
    direction: Direction,
    ctx: &mut ScanContext,
) -> Classified {
    classify(Path::new(file), &root_at(dir, hint), direction, &config(), ctx).unwrap()
}

#[test]
fn test_up_unit_classification() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "V1__init.sql", "create table t (id int);\n");

    let mut ctx = ScanContext::new(false);
    let Classified::Unit(unit) =
        classify_one(dir.path(), "V1__init.sql", None, Direction::Up, &mut ctx)
    else {
        panic!("expected a unit");
    };

    assert_eq!(unit.role, Role::Up);
    assert_eq!(unit.version.as_deref(), Some("1"));
    assert_eq!(unit.name, "init");
    assert_eq!(unit.script, "V1__init.sql");
    assert!(!unit.hash.is_empty());
    assert!(ctx.warnings.is_empty());
}

#[test]
fn test_name_normalizes_non_alphanumeric_runs() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "V2__add-user..table_x.sql", "select 1;\n");

    let mut ctx = ScanContext::new(false);
    let Classified::Unit(unit) = classify_one(
        dir.path(),
        "V2__add-user..table_x.sql",
        None,
        Direction::Up,
        &mut ctx,
    ) else {
        panic!("expected a unit");
    };
    assert_eq!(unit.name, "add user table x");
}

#[test]
fn test_repeatable_prefixes_are_exact_matches() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "R__view.sql", "create view v as select 1;\n");
    write_unit(dir.path(), "R_before__seed.sql", "select 2;\n");

    let mut ctx = ScanContext::new(false);
    let Classified::Unit(rep) = classify_one(dir.path(), "R__view.sql", None, Direction::Up, &mut ctx)
    else {
        panic!("expected a unit");
    };
    assert_eq!(rep.role, Role::Repeatable);
    assert!(rep.version.is_none());

    let Classified::Unit(rb) =
        classify_one(dir.path(), "R_before__seed.sql", None, Direction::Up, &mut ctx)
    else {
        panic!("expected a unit");
    };
    assert_eq!(rb.role, Role::RepeatableBefore);
}

#[test]
fn test_missing_separator_without_hint_warns_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "init.sql", "select 1;\n");

    let mut ctx = ScanContext::new(false);
    let outcome = classify_one(dir.path(), "init.sql", None, Direction::Up, &mut ctx);
    assert!(matches!(
        outcome,
        Classified::Skip(SkipReason::MissingSeparator)
    ));
    assert_eq!(ctx.warnings.len(), 1);
}

#[test]
fn test_directory_hint_overrides_prefix_matching() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "V9__view.sql", "select 1;\n");

    // The file looks like an Up unit, but the directory says Repeatable.
    let mut ctx = ScanContext::new(false);
    let Classified::Unit(unit) = classify_one(
        dir.path(),
        "V9__view.sql",
        Some(Role::Repeatable),
        Direction::Up,
        &mut ctx,
    ) else {
        panic!("expected a unit");
    };
    assert_eq!(unit.role, Role::Repeatable);
    assert!(unit.version.is_none());
}

#[test]
fn test_hinted_directory_accepts_files_without_separator() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "refresh_views.sql", "select 1;\n");

    let mut ctx = ScanContext::new(false);
    let Classified::Unit(unit) = classify_one(
        dir.path(),
        "refresh_views.sql",
        Some(Role::After),
        Direction::Up,
        &mut ctx,
    ) else {
        panic!("expected a unit");
    };
    assert_eq!(unit.role, Role::After);
    assert_eq!(unit.name, "refresh views");
}

#[test]
fn test_empty_version_warns_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "V__init.sql", "select 1;\n");

    let mut ctx = ScanContext::new(false);
    let outcome = classify_one(dir.path(), "V__init.sql", None, Direction::Up, &mut ctx);
    assert!(matches!(outcome, Classified::Skip(SkipReason::EmptyVersion)));
    assert_eq!(ctx.warnings.len(), 1);
}

#[test]
fn test_unmatched_prefix_warns_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "X1__thing.sql", "select 1;\n");

    let mut ctx = ScanContext::new(false);
    let outcome = classify_one(dir.path(), "X1__thing.sql", None, Direction::Up, &mut ctx);
    assert!(matches!(
        outcome,
        Classified::Skip(SkipReason::UnmatchedPrefix)
    ));
}

#[test]
fn test_wrong_extension_warns_and_skips() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "V1__init.txt", "select 1;\n");

    let mut ctx = ScanContext::new(false);
    let outcome = classify_one(dir.path(), "V1__init.txt", None, Direction::Up, &mut ctx);
    assert!(matches!(outcome, Classified::Skip(SkipReason::Extension)));
}

#[test]
fn test_direction_gating_is_silent() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "U1__init.sql", "drop table t;\n");
    write_unit(dir.path(), "V1__init.sql", "create table t (id int);\n");

    let mut ctx = ScanContext::new(false);
    // A Down unit is inactive in the up direction, and vice versa.
    let skipped = classify_one(dir.path(), "U1__init.sql", None, Direction::Up, &mut ctx);
    assert!(matches!(
        skipped,
        Classified::Skip(SkipReason::InactiveDirection)
    ));
    let skipped = classify_one(dir.path(), "V1__init.sql", None, Direction::Down, &mut ctx);
    assert!(matches!(
        skipped,
        Classified::Skip(SkipReason::InactiveDirection)
    ));
    assert!(ctx.warnings.is_empty());

    let Classified::Unit(down) =
        classify_one(dir.path(), "U1__init.sql", None, Direction::Down, &mut ctx)
    else {
        panic!("expected a unit");
    };
    assert_eq!(down.role, Role::Down);
    assert_eq!(down.version.as_deref(), Some("1"));
}

#[test]
fn test_finalize_is_collected_in_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "finalize__vacuum.sql", "vacuum;\n");

    let mut ctx = ScanContext::new(false);
    for direction in [Direction::Up, Direction::Down] {
        let Classified::Unit(unit) =
            classify_one(dir.path(), "finalize__vacuum.sql", None, direction, &mut ctx)
        else {
            panic!("expected a unit");
        };
        assert_eq!(unit.role, Role::Finalize);
    }
}

#[test]
fn test_script_identity_multi_source_prefixes_root() {
    let dir = tempfile::tempdir().unwrap();
    write_unit(dir.path(), "V1__init.sql", "select 1;\n");

    let mut ctx = ScanContext::new(true);
    let Classified::Unit(unit) =
        classify_one(dir.path(), "V1__init.sql", None, Direction::Up, &mut ctx)
    else {
        panic!("expected a unit");
    };
    assert_eq!(unit.script, "migrations/V1__init.sql");
}

#[test]
fn test_claim_name_disambiguates_with_dir_segments_then_counter() {
    let mut ctx = ScanContext::new(true);
    let dir = Path::new("db/auth/changes");

    assert_eq!(ctx.claim_name(Role::Up, "init", dir), "init");
    assert_eq!(ctx.claim_name(Role::Up, "init", dir), "init changes");
    assert_eq!(ctx.claim_name(Role::Up, "init", dir), "init auth changes");
    assert_eq!(
        ctx.claim_name(Role::Up, "init", dir),
        "init db auth changes"
    );
    assert_eq!(ctx.claim_name(Role::Up, "init", dir), "init (2)");
    assert_eq!(ctx.claim_name(Role::Up, "init", dir), "init (3)");
}

#[test]
fn test_claim_name_is_scoped_per_role() {
    let mut ctx = ScanContext::new(false);
    let dir = Path::new("migrations");
    assert_eq!(ctx.claim_name(Role::Up, "cleanup", dir), "cleanup");
    // Same display name under a different role does not collide.
    assert_eq!(ctx.claim_name(Role::Repeatable, "cleanup", dir), "cleanup");
}

#[test]
fn test_normalize_name() {
    assert_eq!(normalize_name("add_user_table"), "add user table");
    assert_eq!(normalize_name("--weird---name--"), "weird name");
    assert_eq!(normalize_name("v1.2.3"), "v1 2 3");
}
