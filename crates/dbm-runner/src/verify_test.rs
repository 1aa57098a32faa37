use super::*;
use std::fs;
use tempfile::tempdir;

#[tokio::test]
async fn test_diff_empty_when_only_whitespace_differs() {
    let dir = tempdir().unwrap();
    let saved = dir.path().join("schema.sql");
    fs::write(&saved, "CREATE TABLE t (\n    id integer\n);\n").unwrap();

    // A missing program proves the external diff is never reached.
    let verifier = SchemaVerifier::with_git("dbm-no-such-diff-program");
    let diff = verifier
        .diff(&saved, "CREATE TABLE t (id integer);\n\n")
        .await
        .unwrap();
    assert_eq!(diff, "");
}

#[cfg(unix)]
#[tokio::test]
async fn test_diff_runs_git_with_saved_file_first() {
    let dir = tempdir().unwrap();
    let saved = dir.path().join("schema.sql");
    fs::write(&saved, "CREATE TABLE t (id integer);\n").unwrap();

    let verifier = SchemaVerifier::with_git("echo");
    let diff = verifier
        .diff(&saved, "CREATE TABLE t (id bigint);\n")
        .await
        .unwrap();
    let args: Vec<&str> = diff.split_whitespace().collect();
    assert_eq!(
        &args[..5],
        &["--no-pager", "diff", "--no-index", "--color", "--ignore-space-at-eol"]
    );
    assert_eq!(args[5], saved.display().to_string());
    assert!(args[6].contains("dbm-schema-"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_diff_program_failure_is_an_error() {
    let dir = tempdir().unwrap();
    let saved = dir.path().join("schema.sql");
    fs::write(&saved, "CREATE TABLE t (id integer);\n").unwrap();

    // `sh` rejects `--no-pager` and exits with status 2.
    let err = SchemaVerifier::with_git("sh")
        .diff(&saved, "CREATE TABLE t (id bigint);\n")
        .await
        .unwrap_err();
    match err {
        RunnerError::DiffFailed { program, code, .. } => {
            assert_eq!(program, "sh");
            assert_ne!(code, 0);
            assert_ne!(code, 1);
        }
        other => panic!("expected DiffFailed, got {other:?}"),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_differing_schemas_never_diff_empty() {
    let dir = tempdir().unwrap();
    let saved = dir.path().join("schema.sql");
    fs::write(&saved, "CREATE TABLE t (id integer);\n").unwrap();

    // `true` exits 0 without printing anything.
    let diff = SchemaVerifier::with_git("true")
        .diff(&saved, "CREATE TABLE t (id bigint);\n")
        .await
        .unwrap();
    assert!(diff.contains("differs from the current schema"));
}

#[tokio::test]
async fn test_diff_missing_saved_schema() {
    let dir = tempdir().unwrap();
    let err = SchemaVerifier::new()
        .diff(&dir.path().join("absent.sql"), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, RunnerError::IoWithPath { .. }));
}

#[test]
fn test_save_writes_new_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schema.sql");
    assert_eq!(save_schema(&path, "CREATE TABLE t ();\n").unwrap(), SaveOutcome::Written);
    assert_eq!(fs::read_to_string(&path).unwrap(), "CREATE TABLE t ();\n");
}

#[test]
fn test_save_is_noop_when_equal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schema.sql");
    fs::write(&path, "CREATE TABLE t ();\n\n").unwrap();
    assert_eq!(save_schema(&path, "CREATE TABLE t ();\n").unwrap(), SaveOutcome::Unchanged);
    assert_eq!(fs::read_to_string(&path).unwrap(), "CREATE TABLE t ();\n\n");
}

#[test]
fn test_save_overwrites_changed_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schema.sql");
    fs::write(&path, "old").unwrap();
    assert_eq!(save_schema(&path, "new").unwrap(), SaveOutcome::Written);
    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
}
