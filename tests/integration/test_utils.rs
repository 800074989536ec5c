//! Shared test utilities for integration tests
//!
//! Fixture modules and archive-tampering helpers. Tampering rewrites the
//! archive through the zip crate while leaving the embedded manifest
//! untouched, which is exactly the attack verification must catch.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Create a module source directory with two task files and content files.
///
/// Sorted enumeration order is `a_tasks.yaml`, `assets/logo.bin`,
/// `b_tasks.json`, `lessons/01_intro.md`; merged task ids are
/// `[1, 2, 3]` and the winning name is "Recon Basics".
pub fn module_fixture(parent: &Path, dir_name: &str) -> PathBuf {
    let source = parent.join(dir_name);
    fs::create_dir_all(source.join("lessons")).unwrap();
    fs::create_dir_all(source.join("assets")).unwrap();

    fs::write(
        source.join("a_tasks.yaml"),
        "name: Module Alpha\ntasks:\n  - id: 1\n    title: Scan the range\n  - id: 2\n    title: Record findings\n",
    )
    .unwrap();
    fs::write(
        source.join("b_tasks.json"),
        r#"{"name": "Recon Basics", "tasks": [{"id": 3, "title": "Write the report"}]}"#,
    )
    .unwrap();
    fs::write(source.join("lessons/01_intro.md"), "# Introduction\n").unwrap();
    fs::write(source.join("assets/logo.bin"), [0u8, 159, 146, 150]).unwrap();

    source
}

fn read_entries(crate_path: &Path) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(File::open(crate_path).unwrap()).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut member = archive.by_index(i).unwrap();
        let name = member.name().to_string();
        let mut content = Vec::new();
        member.read_to_end(&mut content).unwrap();
        entries.push((name, content));
    }
    entries
}

fn write_entries(crate_path: &Path, entries: &[(String, Vec<u8>)]) {
    let mut writer = ZipWriter::new(File::create(crate_path).unwrap());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}

/// Replace one member's bytes post-build without touching the manifest.
pub fn tamper_member(crate_path: &Path, member: &str, new_content: &[u8]) {
    let mut entries = read_entries(crate_path);
    let entry = entries
        .iter_mut()
        .find(|(name, _)| name == member)
        .unwrap_or_else(|| panic!("member {member} not in archive"));
    entry.1 = new_content.to_vec();
    write_entries(crate_path, &entries);
}

/// Append a member the manifest knows nothing about.
pub fn append_member(crate_path: &Path, member: &str, content: &[u8]) {
    let mut entries = read_entries(crate_path);
    entries.push((member.to_string(), content.to_vec()));
    write_entries(crate_path, &entries);
}

/// Drop one member while leaving its manifest hash in place.
pub fn remove_member(crate_path: &Path, member: &str) {
    let entries: Vec<_> = read_entries(crate_path)
        .into_iter()
        .filter(|(name, _)| name != member)
        .collect();
    write_entries(crate_path, &entries);
}
