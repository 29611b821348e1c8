//! Parsed static document set.

use std::collections::BTreeMap;

use crate::formats::{SpawnPoolDocument, SpawnRuleDocument, SpeciesDocument};
use crate::loaders::source::{DocumentKind, DocumentSource, document_id};
use crate::loaders::LoadResult;

/// A document the scan could not use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedDocument {
    pub kind: DocumentKind,
    pub name: String,
    pub reason: String,
}

/// Every static document that parsed. Species are keyed by file stem, the
/// same id registries and evolution references use.
///
/// Immutable once loaded; the resolver shares it behind an `Arc`.
#[derive(Clone, Debug, Default)]
pub struct StaticLibrary {
    species: BTreeMap<String, SpeciesDocument>,
    spawn_pools: BTreeMap<String, SpawnPoolDocument>,
    skipped: Vec<SkippedDocument>,
}

impl StaticLibrary {
    /// Scans a document source.
    ///
    /// A document that cannot be read or parsed is logged and recorded in
    /// [`skipped`](Self::skipped); the scan continues. An error is returned
    /// only when neither document kind can be listed at all.
    pub fn load(source: &dyn DocumentSource) -> LoadResult<Self> {
        let mut library = Self::default();
        let mut listed_any = false;
        let mut list_errors = Vec::new();

        for kind in [DocumentKind::Species, DocumentKind::SpawnPool] {
            let names = match source.list(kind) {
                Ok(names) => {
                    listed_any = true;
                    names
                }
                Err(e) => {
                    tracing::warn!("No {} documents in {}: {}", kind, source.describe(), e);
                    list_errors.push(e.to_string());
                    continue;
                }
            };

            for name in names {
                if let Err(reason) = library.load_document(source, kind, &name) {
                    tracing::warn!("Skipping {} document {}: {}", kind, name, reason);
                    library.skipped.push(SkippedDocument {
                        kind,
                        name,
                        reason,
                    });
                }
            }
        }

        if !listed_any {
            anyhow::bail!(
                "Static documents unavailable in {}: {}",
                source.describe(),
                list_errors.join("; ")
            );
        }

        tracing::info!(
            species = library.species.len(),
            spawn_pools = library.spawn_pools.len(),
            skipped = library.skipped.len(),
            "Loaded static documents from {}",
            source.describe()
        );
        Ok(library)
    }

    fn load_document(
        &mut self,
        source: &dyn DocumentSource,
        kind: DocumentKind,
        name: &str,
    ) -> Result<(), String> {
        let body = source.read(kind, name).map_err(|e| e.to_string())?;
        let id = document_id(name);

        match kind {
            DocumentKind::Species => {
                let doc: SpeciesDocument = serde_json::from_str(&body).map_err(|e| e.to_string())?;
                if doc.implemented == Some(false) {
                    tracing::debug!("Species {} is not implemented, skipping", id);
                    return Ok(());
                }
                self.insert_species(id, doc);
            }
            DocumentKind::SpawnPool => {
                let pool: SpawnPoolDocument =
                    serde_json::from_str(&body).map_err(|e| e.to_string())?;
                if !pool.enabled {
                    tracing::debug!("Spawn pool {} is disabled, skipping", name);
                    return Ok(());
                }
                self.spawn_pools.insert(name.to_string(), pool);
            }
        }
        Ok(())
    }

    /// Adds a species document directly (used by tests and embedders).
    pub fn insert_species(&mut self, id: impl Into<String>, doc: SpeciesDocument) {
        self.species.insert(id.into(), doc);
    }

    /// Adds a spawn pool directly (used by tests and embedders).
    pub fn insert_spawn_pool(&mut self, name: impl Into<String>, pool: SpawnPoolDocument) {
        self.spawn_pools.insert(name.into(), pool);
    }

    pub fn species(&self, id: &str) -> Option<&SpeciesDocument> {
        self.species.get(id)
    }

    /// Species documents in id order.
    pub fn species_documents(&self) -> impl Iterator<Item = (&str, &SpeciesDocument)> {
        self.species.iter().map(|(id, doc)| (id.as_str(), doc))
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    /// Every spawn rule of every enabled pool, with the pool name.
    pub fn spawn_rules(&self) -> impl Iterator<Item = (&str, &SpawnRuleDocument)> {
        self.spawn_pools
            .iter()
            .flat_map(|(name, pool)| pool.spawns.iter().map(move |rule| (name.as_str(), rule)))
    }

    pub fn spawn_pool_count(&self) -> usize {
        self.spawn_pools.len()
    }

    pub fn skipped(&self) -> &[SkippedDocument] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty() && self.spawn_pools.is_empty()
    }
}
