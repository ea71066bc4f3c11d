//! Local catalog of known content hashes.
//!
//! The upstream archive indexes millions of files but knows nothing about
//! what they *are*. The catalog fills that gap: a directory of JSON files,
//! each a flat `hash -> description` object, merged into one in-memory map
//! at startup. Results whose hash appears in the catalog carry its
//! description through both pipelines.
//!
//! The catalog is loaded once, before serving, and never reloaded; request
//! handlers only ever read it. Any malformed catalog file aborts the load.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// Immutable hash-to-description lookup built from a directory of JSON files.
#[derive(Debug, Clone, Default)]
pub struct DescriptionCatalog {
    entries: HashMap<String, String>,
}

impl DescriptionCatalog {
    /// Merge every `*.json` file under `dir` into one catalog.
    ///
    /// Files are visited in lexicographic order; on duplicate hashes the
    /// later file wins. Non-JSON files are skipped. A file that is not a
    /// flat string-to-string object fails the whole load, with no partial
    /// recovery.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            bail!("catalog directory does not exist: {}", dir.display());
        }

        let mut entries: HashMap<String, String> = HashMap::new();

        let walker = WalkDir::new(dir).sort_by_file_name();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
            let records: HashMap<String, String> = serde_json::from_str(&content)
                .with_context(|| format!("Malformed catalog file: {}", path.display()))?;

            // Later files override earlier ones on duplicate hashes
            entries.extend(records);
        }

        Ok(Self { entries })
    }

    /// Build a catalog directly from hash/description pairs.
    pub fn from_entries<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// The description on file for `hash`, if any.
    pub fn lookup(&self, hash: &str) -> Option<&str> {
        self.entries.get(hash).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
