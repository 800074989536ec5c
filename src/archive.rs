//! Crate loading, staged extraction, and integrity verification

use crate::error::LoadError;
use crate::hasher;
use crate::manifest::{Manifest, MANIFEST_ENTRY};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, instrument, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// An opened crate: parsed manifest plus extracted content.
///
/// Content is staged into a directory unique to this load and removed when
/// the value drops, so concurrent loads of the same crate never interfere.
#[derive(Debug)]
pub struct LoadedCrate {
    crate_path: PathBuf,
    manifest: Manifest,
    staging: TempDir,
}

impl LoadedCrate {
    /// Open a crate archive: parse its manifest and extract all content
    /// into a fresh staging directory under the system temp root.
    pub fn open(crate_path: &Path) -> Result<Self, LoadError> {
        Self::open_with_staging(crate_path, None)
    }

    /// Like [`LoadedCrate::open`], staging under `staging_root` instead of
    /// the system temp directory.
    #[instrument(skip_all, fields(crate_path = %crate_path.display()))]
    pub fn open_with_staging(
        crate_path: &Path,
        staging_root: Option<&Path>,
    ) -> Result<Self, LoadError> {
        if !crate_path.is_file() {
            return Err(LoadError::CrateNotFound(crate_path.to_path_buf()));
        }

        let mut archive = open_archive(crate_path)?;
        let manifest = manifest_from_archive(&mut archive, crate_path)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix("crate-load-");
        let staging = match staging_root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };
        extract_all(&mut archive, staging.path())?;

        debug!(
            entries = archive.len(),
            staging = %staging.path().display(),
            "Extracted crate content"
        );
        Ok(Self {
            crate_path: crate_path.to_path_buf(),
            manifest,
            staging,
        })
    }

    /// The validated manifest.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Filesystem location of the content extracted for this load.
    pub fn content_path(&self) -> &Path {
        self.staging.path()
    }

    /// Path of the archive this crate was loaded from.
    pub fn crate_path(&self) -> &Path {
        &self.crate_path
    }

    /// Re-hash every archive member against the manifest.
    ///
    /// Coverage is strict in both directions: the member set (minus the
    /// manifest entry) must equal the manifest's hash keys exactly, and
    /// every recomputed digest must match the recorded one. Returns
    /// `Ok(false)` on the first discrepancy. Pure predicate; neither the
    /// archive nor the manifest is modified.
    #[instrument(skip_all, fields(crate_path = %self.crate_path.display()))]
    pub fn verify(&self) -> Result<bool, LoadError> {
        let mut archive = open_archive(&self.crate_path)?;

        let members: BTreeSet<String> = archive
            .file_names()
            .filter(|name| *name != MANIFEST_ENTRY)
            .map(str::to_string)
            .collect();

        // Duplicate entry names collapse in the set; total entry count
        // exposes them.
        if members.len() + 1 != archive.len() {
            warn!("Archive entry count does not match its member set");
            return Ok(false);
        }

        let indexed: BTreeSet<String> = self.manifest.hashes.keys().cloned().collect();
        if members != indexed {
            warn!(
                members = members.len(),
                indexed = indexed.len(),
                "Archive member set diverges from manifest index"
            );
            return Ok(false);
        }

        for i in 0..archive.len() {
            let mut member = archive.by_index(i)?;
            if member.name() == MANIFEST_ENTRY {
                continue;
            }
            let name = member.name().to_string();
            let expected = &self.manifest.hashes[&name];

            let mut content = Vec::with_capacity(member.size() as usize);
            member.read_to_end(&mut content)?;
            let actual = hasher::digest_bytes(&content);
            if actual != *expected {
                warn!(member = %name, "Content digest mismatch");
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Read only the manifest from a crate archive, without extracting content.
pub fn read_manifest(crate_path: &Path) -> Result<Manifest, LoadError> {
    if !crate_path.is_file() {
        return Err(LoadError::CrateNotFound(crate_path.to_path_buf()));
    }
    let mut archive = open_archive(crate_path)?;
    manifest_from_archive(&mut archive, crate_path)
}

fn open_archive(path: &Path) -> Result<ZipArchive<File>, LoadError> {
    let file = File::open(path)?;
    Ok(ZipArchive::new(file)?)
}

fn manifest_from_archive(
    archive: &mut ZipArchive<File>,
    crate_path: &Path,
) -> Result<Manifest, LoadError> {
    let mut entry = archive.by_name(MANIFEST_ENTRY).map_err(|e| match e {
        ZipError::FileNotFound => LoadError::InvalidManifest {
            path: crate_path.to_path_buf(),
            message: format!("missing {MANIFEST_ENTRY} entry"),
        },
        other => LoadError::Archive(other),
    })?;

    let mut data = String::new();
    entry.read_to_string(&mut data)?;
    Manifest::from_json(&data).map_err(|e| LoadError::InvalidManifest {
        path: crate_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Extract every entry beneath `dest`, rejecting entry names that would
/// escape it. The archive's own index is not trusted.
fn extract_all(archive: &mut ZipArchive<File>, dest: &Path) -> Result<(), LoadError> {
    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        let rel = member
            .enclosed_name()
            .ok_or_else(|| LoadError::UnsafeEntryName(member.name().to_string()))?;
        let target = dest.join(rel);

        if member.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        std::io::copy(&mut member, &mut out)?;
    }
    Ok(())
}
