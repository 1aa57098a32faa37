use super::*;
use crate::patch::{Patch, PatchKind};
use crate::patch_hash::PatchHash;
use std::path::PathBuf;

fn sql(number: &str, content: &str) -> Patch {
    Patch {
        hash: PatchHash::from_content(content),
        content: content.to_string(),
        path: PathBuf::from(format!("/p/{number}.sql")),
        kind: PatchKind::Sql,
        number: number.to_string(),
    }
}

fn set(patches: Vec<Patch>) -> PatchSet {
    PatchSet::from_patches("/p", patches)
}

#[test]
fn test_not_dev_mode_returns_base() {
    let set = set(vec![sql("1", "SELECT 1;")]);
    let namer = InstanceNamer::new("app", &set);
    assert_eq!(namer.instance_name(false), "app");
}

#[test]
fn test_empty_patch_list_returns_base() {
    let set = set(vec![]);
    let namer = InstanceNamer::new("app", &set);
    assert_eq!(namer.instance_name(true), "app");
}

#[test]
fn test_name_depends_on_patch_list() {
    let a = sql("1", "CREATE TABLE a (id int);");
    let b = sql("2", "CREATE TABLE b (id int);");
    let one = set(vec![a.clone()]);
    let two = set(vec![a, b]);

    let name_one = InstanceNamer::new("app", &one).instance_name(true);
    let name_two = InstanceNamer::new("app", &two).instance_name(true);
    assert_ne!(name_one, name_two);
    assert!(name_one.starts_with("app_"));
}

#[test]
fn test_name_is_deterministic() {
    let a = set(vec![sql("1", "SELECT 1;"), sql("2", "SELECT 2;")]);
    let b = set(vec![sql("2", "SELECT 2;"), sql("1", "SELECT 1;")]);
    assert_eq!(
        InstanceNamer::new("app", &a).instance_name(true),
        InstanceNamer::new("app", &b).instance_name(true)
    );
}

#[test]
fn test_name_hashes_joined_content() {
    let set = set(vec![sql("1", "A"), sql("2", "B")]);
    let namer = InstanceNamer::new("app", &set);
    let expected = format!("app_{}", compute_instance_checksum("A\nB"));
    assert_eq!(namer.instance_name(true), expected);
}

#[test]
fn test_name_is_truncated() {
    let set = set(vec![sql("1", "SELECT 1;")]);
    let namer = InstanceNamer::new("a_rather_long_application_database", &set);
    let name = namer.instance_name(true);
    assert_eq!(name.len(), MAX_IDENTIFIER_LEN);
    assert!(name.starts_with("a_rather_long_application_database_"));
}

#[test]
fn test_skipping_matches_shorter_patch_list() {
    let a = sql("1", "SELECT 1;");
    let b = sql("2", "SELECT 2;");
    let c = sql("3", "SELECT 3;");
    let full = set(vec![a.clone(), b, c]);
    let prefix = set(vec![a]);

    let full_namer = InstanceNamer::new("app", &full);
    let prefix_namer = InstanceNamer::new("app", &prefix);
    assert_eq!(
        full_namer.name_skipping(2),
        prefix_namer.instance_name(true)
    );
    assert_eq!(full_namer.name_skipping(3), "app");
    assert_eq!(full_namer.name_skipping(10), "app");
}

#[test]
fn test_candidate_names_end_with_base() {
    let set = set(vec![sql("1", "SELECT 1;"), sql("2", "SELECT 2;")]);
    let namer = InstanceNamer::new("app", &set);
    let candidates = namer.candidate_names();
    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0], namer.instance_name(true));
    assert_eq!(candidates[2], "app");
}

#[test]
fn test_truncate_identifier_respects_char_boundary() {
    let name = format!("{}é", "x".repeat(62));
    assert_eq!(truncate_identifier(&name), "x".repeat(62));
}
