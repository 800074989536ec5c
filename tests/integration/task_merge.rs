//! Task merge semantics observed through full builds

use super::test_utils::module_fixture;
use cratepack::archive::read_manifest;
use cratepack::builder;
use cratepack::error::BuildError;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_merged_tasks_follow_sorted_file_order() {
    let temp = TempDir::new().unwrap();
    let source = module_fixture(temp.path(), "recon_101");
    let output = temp.path().join("crates");

    let crate_path = builder::build(&source, &output).unwrap();
    let manifest = read_manifest(&crate_path).unwrap();

    let ids: Vec<i64> = manifest
        .tasks
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_last_task_file_wins_the_name_and_slug() {
    let temp = TempDir::new().unwrap();
    let source = module_fixture(temp.path(), "recon_101");
    let output = temp.path().join("crates");

    // a_tasks.yaml says "Module Alpha", b_tasks.json says "Recon Basics";
    // b sorts last, so it wins.
    let crate_path = builder::build(&source, &output).unwrap();
    let manifest = read_manifest(&crate_path).unwrap();

    assert_eq!(manifest.name.as_deref(), Some("Recon Basics"));
    assert_eq!(manifest.slug.as_deref(), Some("recon_basics"));
}

#[test]
fn test_name_defaults_to_source_basename() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("unnamed_module");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("tasks.json"), r#"[{"id": "t1"}]"#).unwrap();
    let output = temp.path().join("crates");

    let crate_path = builder::build(&source, &output).unwrap();
    let manifest = read_manifest(&crate_path).unwrap();

    assert_eq!(manifest.name.as_deref(), Some("unnamed_module"));
    assert_eq!(manifest.slug.as_deref(), Some("unnamed_module"));
}

#[test]
fn test_bare_object_task_file_becomes_single_task() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("single");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("task.yaml"), "id: lone\ntitle: Only task\n").unwrap();
    let output = temp.path().join("crates");

    let crate_path = builder::build(&source, &output).unwrap();
    let manifest = read_manifest(&crate_path).unwrap();

    assert_eq!(manifest.tasks.len(), 1);
    assert_eq!(manifest.tasks[0]["id"], "lone");
}

#[test]
fn test_duplicate_task_id_fails_the_build() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("dupes");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("a.yaml"), "tasks:\n  - id: shared\n").unwrap();
    fs::write(source.join("b.yaml"), "tasks:\n  - id: shared\n").unwrap();
    let output = temp.path().join("crates");

    let err = builder::build(&source, &output).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateTaskId { .. }));
    assert!(!output.join("dupes.crate").exists());
}

#[test]
fn test_parse_failure_in_one_file_aborts_the_build() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("broken");
    fs::create_dir(&source).unwrap();
    fs::write(source.join("good.yaml"), "tasks:\n  - id: ok\n").unwrap();
    fs::write(source.join("bad.json"), "{oops").unwrap();
    let output = temp.path().join("crates");

    let err = builder::build(&source, &output).unwrap_err();
    assert!(matches!(err, BuildError::Parse { .. }));
    assert!(!output.join("broken.crate").exists());
}
