//! Crate builder: module source directory to integrity-indexed archive

use crate::error::BuildError;
use crate::hasher;
use crate::manifest::{slugify, Manifest, CRATE_EXTENSION, MANIFEST_ENTRY};
use crate::tasks;
use crate::walker::{self, FileEntry};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Build a `.crate` archive from a module source directory.
///
/// Enumerates the source tree in sorted order, merges task-definition
/// files, hashes every file, and writes the archive with the manifest as
/// its first entry. The archive is staged to a temporary file and renamed
/// into place only on full success, so a failed build never publishes a
/// truncated artifact.
#[instrument(skip_all, fields(source = %source_dir.display()))]
pub fn build(source_dir: &Path, output_dir: &Path) -> Result<PathBuf, BuildError> {
    let start = Instant::now();

    if !source_dir.is_dir() {
        return Err(BuildError::SourceNotFound(source_dir.to_path_buf()));
    }
    let source_dir = source_dir.canonicalize()?;
    fs::create_dir_all(output_dir)?;

    let files = walker::collect_files(&source_dir)?;
    debug!(file_count = files.len(), "Enumerated source tree");

    let task_files: Vec<FileEntry> = files
        .iter()
        .filter(|f| tasks::is_task_source(&f.path))
        .cloned()
        .collect();
    if task_files.is_empty() {
        return Err(BuildError::NoTaskSources(source_dir));
    }

    let merged = tasks::merge_task_files(&task_files)?;

    let stem = source_basename(&source_dir)?;
    let name = merged.name.unwrap_or_else(|| stem.clone());

    let mut manifest = Manifest::new();
    manifest.slug = Some(slugify(&name));
    manifest.name = Some(name);
    manifest.tasks = merged.tasks;

    for entry in &files {
        let digest = hasher::digest_file(&entry.path)?;
        manifest.hashes.insert(entry.rel_path.clone(), digest);
    }

    let crate_path = output_dir.join(format!("{stem}.{CRATE_EXTENSION}"));
    write_archive(&manifest, &files, output_dir, &crate_path)?;

    info!(
        crate_path = %crate_path.display(),
        files = manifest.hashes.len(),
        tasks = manifest.tasks.len(),
        duration_ms = start.elapsed().as_millis(),
        "Crate build completed"
    );
    Ok(crate_path)
}

/// Outcome of one module in a batch build.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Module source directory
    pub module: PathBuf,
    /// Crate path on success, the module's own failure otherwise
    pub result: Result<PathBuf, BuildError>,
}

/// Build every immediate subdirectory of `modules_dir` into `output_dir`.
///
/// Failures are isolated per module: each is logged and the remaining
/// modules still build. Outcomes are returned in sorted module order.
#[instrument(skip_all, fields(modules_dir = %modules_dir.display()))]
pub fn build_all(
    modules_dir: &Path,
    output_dir: &Path,
) -> Result<Vec<BatchOutcome>, BuildError> {
    if !modules_dir.is_dir() {
        return Err(BuildError::SourceNotFound(modules_dir.to_path_buf()));
    }

    let mut module_dirs: Vec<PathBuf> = fs::read_dir(modules_dir)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    module_dirs.sort();

    let mut outcomes = Vec::with_capacity(module_dirs.len());
    for module in module_dirs {
        let result = build(&module, output_dir);
        if let Err(ref e) = result {
            error!(module = %module.display(), error = %e, "Module build failed");
        }
        outcomes.push(BatchOutcome { module, result });
    }
    Ok(outcomes)
}

fn source_basename(source_dir: &Path) -> Result<String, BuildError> {
    source_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| BuildError::SourceNotFound(source_dir.to_path_buf()))
}

/// Write the archive: manifest entry first, then every file at its
/// relative path, all DEFLATE-compressed. Staged in the output directory
/// so the final publish is a same-filesystem rename.
fn write_archive(
    manifest: &Manifest,
    files: &[FileEntry],
    output_dir: &Path,
    final_path: &Path,
) -> Result<(), BuildError> {
    let staging = tempfile::Builder::new()
        .prefix(".crate-build-")
        .suffix(".tmp")
        .tempfile_in(output_dir)?;

    {
        let mut writer = ZipWriter::new(staging.as_file());
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        writer.start_file(MANIFEST_ENTRY, options)?;
        writer.write_all(manifest.to_pretty_json()?.as_bytes())?;

        for entry in files {
            writer.start_file(entry.rel_path.as_str(), options)?;
            let content = fs::read(&entry.path)?;
            writer.write_all(&content)?;
        }

        writer.finish()?;
    }

    staging
        .persist(final_path)
        .map_err(|e| BuildError::IoError(e.error))?;
    Ok(())
}
