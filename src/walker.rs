//! Deterministic file enumeration for module source directories

use crate::error::BuildError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file discovered under a source directory.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// On-disk path of the file
    pub path: PathBuf,
    /// Archive-relative path, forward-slash separated regardless of host
    pub rel_path: String,
}

/// Enumerate every file under `root`, sorted by relative path.
///
/// Symbolic links are not followed. Sorting makes merge order and
/// name tie-breaks platform-independent.
pub fn collect_files(root: &Path) -> Result<Vec<FileEntry>, BuildError> {
    let mut entries = Vec::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| BuildError::IoError(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry.path().strip_prefix(root).map_err(|e| {
            BuildError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Path {:?} escapes source root: {}", entry.path(), e),
            ))
        })?;
        let rel_path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        entries.push(FileEntry {
            path: entry.path().to_path_buf(),
            rel_path,
        });
    }

    entries.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(entries)
}
