use super::*;
use std::fs;
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_discover_orders_numerically() {
    let temp = tempdir().unwrap();
    let dir = temp.path();
    // Written out of order, and with differing widths so plain string
    // ordering would put "10" before "9".
    write(dir, "10.sql", "SELECT 10;");
    write(dir, "9.sql", "SELECT 9;");
    write(dir, "0002.sql", "SELECT 2;");
    write(dir, "0001.sql", "SELECT 1;");

    let set = PatchSet::discover(dir).unwrap();
    let numbers: Vec<&str> = set.iter().map(|p| p.number.as_str()).collect();
    assert_eq!(numbers, vec!["0001", "0002", "9", "10"]);
}

#[test]
fn test_discover_equal_numbers_tiebreak_on_path() {
    let temp = tempdir().unwrap();
    let dir = temp.path();
    write(dir, "0003.sql", "SELECT 3;");
    write(dir, "3.py", "print(3)");

    let set = PatchSet::discover(dir).unwrap();
    let names: Vec<String> = set
        .iter()
        .map(|p| p.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["0003.sql", "3.py"]);
}

#[test]
fn test_discover_kinds() {
    let temp = tempdir().unwrap();
    let dir = temp.path();
    write(dir, "0001.sql", "CREATE TABLE t (id int);");
    write(dir, "0002.py", "print('hi')");
    write(dir, "0003.sh", "#!/bin/sh\necho hi");

    let set = PatchSet::discover(dir).unwrap();
    let kinds: Vec<PatchKind> = set.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![PatchKind::Sql, PatchKind::Python, PatchKind::Shell]
    );
    assert_eq!(set.len(), 3);
    assert_eq!(set.dir(), dir);
}

#[test]
fn test_discover_hash_is_content_hash() {
    let temp = tempdir().unwrap();
    write(temp.path(), "0001.sql", "CREATE TABLE t (id int);");

    let set = PatchSet::discover(temp.path()).unwrap();
    assert_eq!(
        set.patches()[0].hash,
        PatchHash::from_content("CREATE TABLE t (id int);")
    );
}

#[test]
fn test_discover_skips_asset_directories() {
    let temp = tempdir().unwrap();
    let dir = temp.path();
    write(dir, "0001.sql", "SELECT 1;");
    fs::create_dir(dir.join("0002")).unwrap();
    write(&dir.join("0002"), "data.csv", "a,b\n1,2\n");
    write(dir, "0002.sh", "#!/bin/sh\ncat \"$PATCHES_ROOT/0002/data.csv\"");

    let set = PatchSet::discover(dir).unwrap();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_discover_rejects_invalid_file_name() {
    let temp = tempdir().unwrap();
    write(temp.path(), "0001.sql", "SELECT 1;");
    write(temp.path(), "README.md", "notes");

    let err = PatchSet::discover(temp.path()).unwrap_err();
    match err {
        CoreError::InvalidPatchFilename { path, .. } => assert!(path.ends_with("README.md")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_discover_rejects_prefixed_name() {
    let temp = tempdir().unwrap();
    write(temp.path(), "patch0001.sql", "SELECT 1;");

    let err = PatchSet::discover(temp.path()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidPatchFilename { .. }));
}

#[test]
fn test_discover_rejects_named_directory() {
    let temp = tempdir().unwrap();
    fs::create_dir(temp.path().join("assets")).unwrap();

    let err = PatchSet::discover(temp.path()).unwrap_err();
    assert!(matches!(err, CoreError::InvalidPatchFilename { .. }));
}

#[test]
fn test_discover_rejects_duplicate_content() {
    let temp = tempdir().unwrap();
    write(temp.path(), "0001.sql", "CREATE TABLE t (id int);");
    write(temp.path(), "0002.sql", "CREATE TABLE t (id int);");

    let err = PatchSet::discover(temp.path()).unwrap_err();
    assert!(matches!(err, CoreError::DuplicatePatchHash { .. }));
}

#[test]
fn test_discover_missing_directory() {
    let temp = tempdir().unwrap();
    let err = PatchSet::discover(&temp.path().join("nope")).unwrap_err();
    assert!(matches!(err, CoreError::PatchDirNotFound { .. }));
}

#[test]
fn test_discover_empty_directory() {
    let temp = tempdir().unwrap();
    let set = PatchSet::discover(temp.path()).unwrap();
    assert!(set.is_empty());
}

#[test]
fn test_unapplied_and_invalid_hashes() {
    let temp = tempdir().unwrap();
    let dir = temp.path();
    write(dir, "0001.sql", "SELECT 1;");
    write(dir, "0002.sql", "SELECT 2;");
    write(dir, "0003.sql", "SELECT 3;");
    let set = PatchSet::discover(dir).unwrap();

    let orphan = PatchHash::from_content("SELECT 'deleted';");
    let applied: HashSet<PatchHash> = [set.patches()[0].hash.clone(), orphan.clone()]
        .into_iter()
        .collect();

    let unapplied: Vec<&str> = set
        .unapplied(&applied)
        .iter()
        .map(|p| p.number.as_str())
        .collect();
    assert_eq!(unapplied, vec!["0002", "0003"]);

    let invalid = set.invalid_hashes(&applied);
    assert_eq!(invalid.len(), 1);
    assert!(invalid.contains(&orphan));
}

#[test]
fn test_compare_numeric() {
    assert_eq!(compare_numeric("0009", "10"), Ordering::Less);
    assert_eq!(compare_numeric("010", "10"), Ordering::Equal);
    assert_eq!(
        compare_numeric("123456789012345678901234567890", "9"),
        Ordering::Greater
    );
}
