//! Error types for crate packaging, loading, and verification.

use std::path::PathBuf;
use thiserror::Error;

/// Build-time errors
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Source directory not found: {0:?}")]
    SourceNotFound(PathBuf),

    #[error("No task-definition files found in {0:?}")]
    NoTaskSources(PathBuf),

    #[error("Failed to parse task file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Task without an 'id' field in {0:?}")]
    TaskMissingId(PathBuf),

    #[error("Duplicate task id '{id}' introduced by {path:?}")]
    DuplicateTaskId { id: String, path: PathBuf },

    #[error("Failed to encode manifest: {0}")]
    ManifestEncode(#[from] serde_json::Error),

    #[error("Archive write failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Build I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Load/verify-time errors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Crate not found: {0:?}")]
    CrateNotFound(PathBuf),

    #[error("Invalid manifest in {path:?}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("Unsafe entry name in archive: {0}")]
    UnsafeEntryName(String),

    #[error("Archive read failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Load I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid logging settings: {0}")]
    Logging(String),
}

/// Top-level CLI error, aggregating the domain error families.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Integrity check failed for {0:?}")]
    IntegrityFailed(PathBuf),

    #[error("Invalid output format: {0} (must be 'text' or 'json')")]
    InvalidFormat(String),
}
