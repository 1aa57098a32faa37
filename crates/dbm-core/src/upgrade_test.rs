use super::*;

const ROOT: &str = "/repo";

fn patch(number: &str, kind: PatchKind, content: &str) -> Patch {
    let ext = match kind {
        PatchKind::Sql => "sql",
        PatchKind::Python => "py",
        PatchKind::Shell => "sh",
    };
    Patch {
        hash: PatchHash::from_content(content),
        content: content.to_string(),
        path: PathBuf::from(format!("{ROOT}/patches/{number}.{ext}")),
        kind,
        number: number.to_string(),
    }
}

fn sql(number: &str, content: &str) -> Patch {
    patch(number, PatchKind::Sql, content)
}

fn set(patches: Vec<Patch>) -> PatchSet {
    PatchSet::from_patches(format!("{ROOT}/patches"), patches)
}

fn applied(patches: &[&Patch]) -> HashSet<PatchHash> {
    patches.iter().map(|p| p.hash.clone()).collect()
}

fn plan(set: &PatchSet, applied: &HashSet<PatchHash>) -> Option<Upgrade> {
    UpgradePlanner::new(set, Path::new(ROOT))
        .next_upgrade(applied)
        .unwrap()
}

#[test]
fn test_no_patches_no_upgrade() {
    let set = set(vec![]);
    assert_eq!(plan(&set, &HashSet::new()), None);
}

#[test]
fn test_fully_applied_is_noop() {
    let a = sql("0001", "CREATE TABLE a (id int);");
    let b = sql("0002", "CREATE TABLE b (id int);");
    let applied = applied(&[&a, &b]);
    let set = set(vec![a, b]);
    assert_eq!(plan(&set, &applied), None);
}

#[test]
fn test_merge_two_patches_example() {
    let a = sql("0001", "CREATE TABLE t(id int);");
    let b = sql("0002", "ALTER TABLE t ADD COLUMN name text;");
    let (ha, hb) = (a.hash.clone(), b.hash.clone());
    let set = set(vec![a, b]);

    let Some(Upgrade::Sql(upgrade)) = plan(&set, &HashSet::new()) else {
        panic!("expected a SQL upgrade");
    };
    assert!(upgrade.query.contains("CREATE TABLE t(id int);"));
    assert!(upgrade.query.contains("ALTER TABLE t ADD COLUMN name text;"));
    assert_eq!(upgrade.query.matches("INSERT INTO db_patches").count(), 2);
    assert!(upgrade.query.contains(&ha.to_sql_literal()));
    assert!(upgrade.query.contains(&hb.to_sql_literal()));
    assert_eq!(upgrade.hashes, vec![ha, hb]);
}

#[test]
fn test_merge_three_patches_in_order() {
    let patches = vec![
        sql("0003", "CREATE TABLE c (id int);"),
        sql("0001", "CREATE TABLE a (id int);"),
        sql("0002", "CREATE TABLE b (id int);"),
    ];
    let set = set(patches);

    let Some(Upgrade::Sql(upgrade)) = plan(&set, &HashSet::new()) else {
        panic!("expected a SQL upgrade");
    };
    assert_eq!(upgrade.files.len(), 3);
    assert_eq!(upgrade.hashes.len(), 3);
    assert_eq!(upgrade.followups.len(), 3);
    assert_eq!(
        upgrade.files,
        vec![
            PathBuf::from("/repo/patches/0001.sql"),
            PathBuf::from("/repo/patches/0002.sql"),
            PathBuf::from("/repo/patches/0003.sql"),
        ]
    );
    let a = upgrade.query.find("CREATE TABLE a").unwrap();
    let b = upgrade.query.find("CREATE TABLE b").unwrap();
    let c = upgrade.query.find("CREATE TABLE c").unwrap();
    assert!(a < b && b < c);
}

#[test]
fn test_followups_align_with_files() {
    let a = sql("0001", "CREATE TABLE a (id int);");
    let b = sql("0002", "CREATE TABLE b (id int);");
    let set = set(vec![a.clone(), b.clone()]);

    let Some(Upgrade::Sql(upgrade)) = plan(&set, &HashSet::new()) else {
        panic!("expected a SQL upgrade");
    };
    assert_eq!(upgrade.followups[0], insert_statement(&[a.hash]));
    assert_eq!(upgrade.followups[1], insert_statement(&[b.hash]));
}

#[test]
fn test_merged_header_lists_relative_file() {
    let set = set(vec![sql("0001", "SELECT 1;")]);
    let Some(Upgrade::Sql(upgrade)) = plan(&set, &HashSet::new()) else {
        panic!("expected a SQL upgrade");
    };
    assert!(upgrade
        .query
        .starts_with(&format!("{SEPARATOR}\n-- Upgrades:\n--     //patches/0001.sql\n")));
}

#[test]
fn test_only_unapplied_suffix_is_planned() {
    let a = sql("0001", "CREATE TABLE a (id int);");
    let b = sql("0002", "CREATE TABLE b (id int);");
    let applied = applied(&[&a]);
    let set = set(vec![a, b]);

    let Some(Upgrade::Sql(upgrade)) = plan(&set, &applied) else {
        panic!("expected a SQL upgrade");
    };
    assert_eq!(upgrade.files, vec![PathBuf::from("/repo/patches/0002.sql")]);
    assert!(!upgrade.query.contains("CREATE TABLE a"));
}

#[test]
fn test_script_stops_the_run() {
    let set = set(vec![
        sql("0001", "CREATE TABLE a (id int);"),
        patch("0002", PatchKind::Python, "print('backfill')"),
        sql("0003", "CREATE TABLE c (id int);"),
    ]);

    let Some(Upgrade::Sql(upgrade)) = plan(&set, &HashSet::new()) else {
        panic!("expected a SQL upgrade");
    };
    assert_eq!(upgrade.files.len(), 1);
}

#[test]
fn test_leading_script_is_returned_alone() {
    let first = patch("0001", PatchKind::Shell, "#!/bin/sh\necho hi");
    let set = set(vec![first.clone(), sql("0002", "SELECT 1;")]);

    match plan(&set, &HashSet::new()) {
        Some(Upgrade::Shell(script)) => {
            assert_eq!(script.script, first.path);
            assert_eq!(script.hashes, vec![first.hash]);
        }
        other => panic!("expected a shell upgrade, got {other:?}"),
    }
}

#[test]
fn test_python_upgrade_variant() {
    let set = set(vec![patch("0001", PatchKind::Python, "print(1)")]);
    let upgrade = plan(&set, &HashSet::new()).unwrap();
    assert!(matches!(upgrade, Upgrade::Python(_)));
    assert_eq!(upgrade.label(), "Python");
    assert_eq!(upgrade.body(), "/repo/patches/0001.py");
}

#[test]
fn test_split_patch_stops_the_run() {
    let set = set(vec![
        sql("0001", "CREATE TABLE a (id int);"),
        sql("0002", "ALTER TYPE mood ADD VALUE 'meh';"),
        sql("0003", "CREATE TABLE c (id int);"),
    ]);

    let Some(Upgrade::Sql(upgrade)) = plan(&set, &HashSet::new()) else {
        panic!("expected a SQL upgrade");
    };
    assert_eq!(upgrade.files, vec![PathBuf::from("/repo/patches/0001.sql")]);
}

#[test]
fn test_split_patch_is_planned_alone() {
    let a = sql("0001", "ALTER TYPE mood ADD VALUE 'meh';");
    let b = sql("0002", "CREATE TABLE c (id int);");
    let set = set(vec![a.clone(), b]);

    let Some(Upgrade::Sql(upgrade)) = plan(&set, &HashSet::new()) else {
        panic!("expected a SQL upgrade");
    };
    assert_eq!(upgrade.hashes, vec![a.hash]);
    assert!(must_split(&upgrade.query));
}

#[test]
fn test_split_patch_defining_routine_fails_planning() {
    let a = sql("0001", "CREATE TABLE a (id int);");
    let b = sql(
        "0002",
        "ALTER TYPE mood ADD VALUE 'sad';\n\
         CREATE FUNCTION f() RETURNS int AS $$ SELECT 1; $$ LANGUAGE sql;",
    );
    let set = set(vec![a.clone(), b]);
    let planner = UpgradePlanner::new(&set, Path::new(ROOT));

    // The plain patch ahead of it is still planned on its own.
    let Some(Upgrade::Sql(first)) = planner.next_upgrade(&HashSet::new()).unwrap() else {
        panic!("expected a SQL upgrade");
    };
    assert_eq!(first.hashes, vec![a.hash.clone()]);

    let err = planner.next_upgrade(&applied(&[&a])).unwrap_err();
    assert!(matches!(err, CoreError::UnsplittableQuery));
}

#[test]
fn test_combine_empty_is_error() {
    let set = set(vec![]);
    let planner = UpgradePlanner::new(&set, Path::new(ROOT));
    let err = planner.combine_sql_upgrades(vec![]).unwrap_err();
    assert!(matches!(err, CoreError::EmptyUpgrade));
}
