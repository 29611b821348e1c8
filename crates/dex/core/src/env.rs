//! Collaborator traits consumed by the resolution layer.
//!
//! These mirror the oracle pattern: the layer never owns the entity catalog
//! or the localization tables, it only queries them.

use std::collections::HashMap;

use crate::label::normalize_id;

/// Enumerates known species and their canonical ordinal (dex number).
///
/// The ordinal drives the presentation order of reverse indices.
pub trait SpeciesCatalog: Send + Sync {
    /// All known species ids.
    fn ids(&self) -> Vec<String>;

    /// Canonical ordinal of a species, if known.
    fn ordinal(&self, id: &str) -> Option<u32>;
}

/// Returns a locale-specific string for a symbolic key.
///
/// Implementations return the key unchanged when no translation exists.
pub trait Localizer: Send + Sync {
    fn localize(&self, key: &str, locale: &str) -> String;
}

/// Localizer that never translates.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityLocalizer;

impl Localizer for IdentityLocalizer {
    fn localize(&self, key: &str, _locale: &str) -> String {
        key.to_string()
    }
}

/// Map-backed [`SpeciesCatalog`].
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    ordinals: HashMap<String, u32>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: &str, ordinal: u32) {
        self.ordinals.insert(normalize_id(id), ordinal);
    }

    pub fn len(&self) -> usize {
        self.ordinals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordinals.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, u32)> for StaticCatalog {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (id, ordinal) in iter {
            catalog.insert(id.as_ref(), ordinal);
        }
        catalog
    }
}

impl SpeciesCatalog for StaticCatalog {
    fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ordinals.keys().cloned().collect();
        ids.sort_by_key(|id| (self.ordinals[id], id.clone()));
        ids
    }

    fn ordinal(&self, id: &str) -> Option<u32> {
        self.ordinals.get(&normalize_id(id)).copied()
    }
}
