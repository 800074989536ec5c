//! Crates-directory scanning and module resolution

use super::test_utils::module_fixture;
use cratepack::builder;
use cratepack::catalog::Catalog;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_scan_summarizes_built_crates() {
    let temp = TempDir::new().unwrap();
    let source = module_fixture(temp.path(), "recon_101");
    let crates_dir = temp.path().join("crates");
    builder::build(&source, &crates_dir).unwrap();

    let catalog = Catalog::scan(&crates_dir).unwrap();
    assert_eq!(catalog.crates().len(), 1);

    let summary = &catalog.crates()[0];
    assert_eq!(summary.stem, "recon_101");
    assert_eq!(summary.display_name, "Recon Basics");
    assert_eq!(summary.slug.as_deref(), Some("recon_basics"));
    assert_eq!(summary.task_count, 3);
}

#[test]
fn test_scan_skips_unreadable_crates() {
    let temp = TempDir::new().unwrap();
    let source = module_fixture(temp.path(), "recon_101");
    let crates_dir = temp.path().join("crates");
    builder::build(&source, &crates_dir).unwrap();
    fs::write(crates_dir.join("corrupt.crate"), b"not a zip at all").unwrap();

    let catalog = Catalog::scan(&crates_dir).unwrap();
    assert_eq!(catalog.crates().len(), 1);
    assert_eq!(catalog.crates()[0].stem, "recon_101");
}

#[test]
fn test_resolve_by_stem_slug_and_underscored_name() {
    let temp = TempDir::new().unwrap();
    let source = module_fixture(temp.path(), "recon_101");
    let crates_dir = temp.path().join("crates");
    builder::build(&source, &crates_dir).unwrap();

    let catalog = Catalog::scan(&crates_dir).unwrap();
    assert!(catalog.resolve("recon_101").is_some());
    assert!(catalog.resolve("recon_basics").is_some());
    assert!(catalog.resolve("Recon_Basics").is_some());
    assert!(catalog.resolve("unknown_module").is_none());
}

#[test]
fn test_resolve_prefers_exact_stem() {
    let temp = TempDir::new().unwrap();
    // Two modules: one whose stem equals the other's slug.
    let first = temp.path().join("alpha");
    fs::create_dir(&first).unwrap();
    fs::write(first.join("tasks.yaml"), "name: Beta\ntasks:\n  - id: a\n").unwrap();

    let second = temp.path().join("beta");
    fs::create_dir(&second).unwrap();
    fs::write(second.join("tasks.yaml"), "name: Other\ntasks:\n  - id: b\n").unwrap();

    let crates_dir = temp.path().join("crates");
    builder::build(&first, &crates_dir).unwrap();
    builder::build(&second, &crates_dir).unwrap();

    let catalog = Catalog::scan(&crates_dir).unwrap();
    // "beta" is both the stem of beta.crate and the slug of alpha.crate;
    // the stem match wins.
    let resolved = catalog.resolve("beta").unwrap();
    assert_eq!(resolved.stem, "beta");
}

#[test]
fn test_scan_missing_directory_fails() {
    let temp = TempDir::new().unwrap();
    assert!(Catalog::scan(&temp.path().join("absent")).is_err());
}
