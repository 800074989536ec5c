//! Crate manifest: the authoritative index embedded in every crate

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Manifest schema version written by this builder.
pub const FORMAT_VERSION: &str = "1.0";

/// Reserved archive entry holding the serialized manifest.
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Reserved extension for crate archives.
pub const CRATE_EXTENSION: &str = "crate";

/// Authoritative description of one crate.
///
/// Constructed fully in memory during a build, serialized once into the
/// archive, and treated as read-only thereafter. `hashes` uses a `BTreeMap`
/// so serialization order is reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest schema version
    pub version: String,

    /// Display name for the module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Immutable URL-safe identifier, recorded at build time.
    /// Absent in crates built before the field existed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Archive-relative path -> lowercase hex content digest
    pub hashes: BTreeMap<String, String>,

    /// Merged task records, in task-file concatenation order.
    /// Opaque beyond the required `id` field.
    pub tasks: Vec<serde_json::Value>,
}

impl Manifest {
    /// Empty manifest at the current schema version.
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            name: None,
            slug: None,
            hashes: BTreeMap::new(),
            tasks: Vec::new(),
        }
    }

    /// Display name, falling back to the given archive stem when unset.
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }

    /// Serialize as the pretty-printed JSON stored in the archive.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from manifest entry bytes.
    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the immutable URL-safe identifier stored at build time.
///
/// Lowercase alphanumeric runs joined by underscores:
/// `"Recon Basics 101"` becomes `"recon_basics_101"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut gap = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('_');
            }
            gap = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            gap = true;
        }
    }
    slug
}
