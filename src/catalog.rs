//! Crate discovery and module resolution over a crates directory

use crate::archive;
use crate::error::LoadError;
use crate::manifest::CRATE_EXTENSION;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Summary of one discovered crate.
#[derive(Debug, Clone, Serialize)]
pub struct CrateSummary {
    /// Archive path
    pub path: PathBuf,
    /// Archive file stem, the primary lookup key
    pub stem: String,
    /// Manifest name, falling back to the stem
    pub display_name: String,
    /// Stored slug, when the manifest carries one
    pub slug: Option<String>,
    /// Number of merged tasks
    pub task_count: usize,
}

/// Index over the crates directory.
pub struct Catalog {
    crates: Vec<CrateSummary>,
}

impl Catalog {
    /// Scan a crates directory for `*.crate` archives, in sorted order.
    ///
    /// Unreadable crates are logged and skipped so one bad artifact cannot
    /// hide the rest of the served list.
    pub fn scan(crates_dir: &Path) -> Result<Self, LoadError> {
        if !crates_dir.is_dir() {
            return Err(LoadError::CrateNotFound(crates_dir.to_path_buf()));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(crates_dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.extension().and_then(|e| e.to_str()) == Some(CRATE_EXTENSION)
            })
            .collect();
        paths.sort();

        let mut crates = Vec::new();
        for path in paths {
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_string(),
                None => continue,
            };
            match archive::read_manifest(&path) {
                Ok(manifest) => {
                    let display_name = manifest.display_name(&stem).to_string();
                    crates.push(CrateSummary {
                        path,
                        stem,
                        display_name,
                        slug: manifest.slug,
                        task_count: manifest.tasks.len(),
                    });
                }
                Err(e) => {
                    warn!(crate_path = %path.display(), error = %e, "Skipping unreadable crate");
                }
            }
        }

        debug!(count = crates.len(), "Scanned crates directory");
        Ok(Self { crates })
    }

    /// All discovered crates, in sorted path order.
    pub fn crates(&self) -> &[CrateSummary] {
        &self.crates
    }

    /// Resolve a requested module identifier.
    ///
    /// Match order: exact file stem, stored slug, then the legacy
    /// name-with-underscores mapping for crates built before slugs were
    /// recorded. The legacy mapping is not collision-free, which is why
    /// the stored slug takes precedence.
    pub fn resolve(&self, query: &str) -> Option<&CrateSummary> {
        self.crates
            .iter()
            .find(|c| c.stem == query)
            .or_else(|| {
                self.crates
                    .iter()
                    .find(|c| c.slug.as_deref() == Some(query))
            })
            .or_else(|| {
                self.crates
                    .iter()
                    .find(|c| c.display_name.replace(' ', "_") == query)
            })
    }
}
