//! Where static documents come from.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dex_core::normalize_id;

use crate::loaders::{LoadResult, read_file};

/// Kinds of static documents.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum DocumentKind {
    /// One document per species.
    Species,
    /// Spawn pool documents, usually one per species.
    SpawnPool,
}

impl DocumentKind {
    /// Directory holding this kind of document inside a data root.
    pub const fn directory(&self) -> &'static str {
        match self {
            Self::Species => "species",
            Self::SpawnPool => "spawn_pool_world",
        }
    }
}

/// A set of named documents.
///
/// Document names are relative paths such as `generation1/bulbasaur.json`.
pub trait DocumentSource: Send + Sync {
    /// Names of every document of a kind, sorted.
    fn list(&self, kind: DocumentKind) -> LoadResult<Vec<String>>;

    /// Raw text of one document.
    fn read(&self, kind: DocumentKind, name: &str) -> LoadResult<String>;

    /// Human-readable description used in log messages.
    fn describe(&self) -> String {
        "documents".to_string()
    }
}

/// Entity id of a document: its file stem, lower-cased.
///
/// `generation1/0001_Bulbasaur.json` -> `0001_bulbasaur`.
pub fn document_id(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(normalize_id)
        .unwrap_or_else(|| normalize_id(name))
}

/// Documents stored as `*.json` files under a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── species/
/// │   └── generation1/
/// │       └── bulbasaur.json
/// └── spawn_pool_world/
///     └── 0001_bulbasaur.json
/// ```
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn walk(dir: &Path, base: &Path, out: &mut Vec<String>) -> LoadResult<()> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };
            if path.is_dir() {
                if let Err(e) = Self::walk(&path, base, out) {
                    tracing::warn!("{}", e);
                }
            } else if path.extension().is_some_and(|ext| ext == "json")
                && let Ok(relative) = path.strip_prefix(base)
            {
                out.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(())
    }
}

impl DocumentSource for DirectorySource {
    fn list(&self, kind: DocumentKind) -> LoadResult<Vec<String>> {
        let dir = self.root.join(kind.directory());
        let mut names = Vec::new();
        Self::walk(&dir, &dir, &mut names)?;
        names.sort();
        Ok(names)
    }

    fn read(&self, kind: DocumentKind, name: &str) -> LoadResult<String> {
        read_file(&self.root.join(kind.directory()).join(name))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Documents held in memory, for embedding and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    documents: BTreeMap<(DocumentKind, String), String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: DocumentKind, name: impl Into<String>, body: impl Into<String>) {
        self.documents.insert((kind, name.into()), body.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, kind: DocumentKind, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(kind, name, body);
        self
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

impl DocumentSource for MemorySource {
    fn list(&self, kind: DocumentKind) -> LoadResult<Vec<String>> {
        Ok(self
            .documents
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect())
    }

    fn read(&self, kind: DocumentKind, name: &str) -> LoadResult<String> {
        self.documents
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No {} document named {}", kind, name))
    }

    fn describe(&self) -> String {
        format!("{} in-memory documents", self.documents.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_ids_use_the_file_stem() {
        assert_eq!(document_id("generation1/Bulbasaur.json"), "bulbasaur");
        assert_eq!(document_id("pikachu.json"), "pikachu");
    }

    #[test]
    fn directory_source_walks_nested_json() {
        let dir = tempfile::tempdir().unwrap();
        let species = dir.path().join("species").join("generation1");
        std::fs::create_dir_all(&species).unwrap();
        std::fs::write(species.join("bulbasaur.json"), "{}").unwrap();
        std::fs::write(species.join("notes.txt"), "ignored").unwrap();

        let source = DirectorySource::new(dir.path());
        let names = source.list(DocumentKind::Species).unwrap();
        assert_eq!(names, vec!["generation1/bulbasaur.json"]);
        assert_eq!(source.read(DocumentKind::Species, &names[0]).unwrap(), "{}");
        assert!(source.list(DocumentKind::SpawnPool).is_err());
    }

    #[test]
    fn memory_source_filters_by_kind() {
        let source = MemorySource::new()
            .with(DocumentKind::Species, "a.json", "{}")
            .with(DocumentKind::SpawnPool, "b.json", "{}");
        assert_eq!(source.list(DocumentKind::Species).unwrap(), vec!["a.json"]);
        assert!(source.read(DocumentKind::Species, "b.json").is_err());
    }
}
