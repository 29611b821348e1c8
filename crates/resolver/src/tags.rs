//! Biome tag expansion with per-locale memoization.

use std::sync::Arc;

use dashmap::DashMap;
use dex_core::{Localizer, format_label, strip_namespace};

use crate::live::TagRegistry;

/// Namespace assumed for member ids that carry none.
const DEFAULT_NAMESPACE: &str = "minecraft";

/// Memoizes `(tag, locale) -> sorted display names`.
///
/// An unavailable registry yields an empty list, and that empty list is
/// cached for the key like any other result.
pub struct TagResolutionCache {
    registry: Arc<dyn TagRegistry>,
    localizer: Arc<dyn Localizer>,
    cache: DashMap<(String, String), Arc<[String]>>,
}

impl TagResolutionCache {
    pub fn new(registry: Arc<dyn TagRegistry>, localizer: Arc<dyn Localizer>) -> Self {
        Self {
            registry,
            localizer,
            cache: DashMap::new(),
        }
    }

    pub fn resolve(&self, tag: &str, locale: &str) -> Arc<[String]> {
        let tag = tag.trim().trim_start_matches('#');
        let key = (tag.to_string(), locale.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return Arc::clone(hit.value());
        }

        let mut names: Vec<String> = match self.registry.members(tag) {
            Some(members) => members
                .iter()
                .map(|member| self.display_name(member, locale))
                .collect(),
            None => {
                tracing::debug!("Tag registry unavailable, caching empty expansion for #{}", tag);
                Vec::new()
            }
        };
        names.sort();
        names.dedup();

        let names: Arc<[String]> = names.into();
        self.cache.insert(key, Arc::clone(&names));
        names
    }

    /// Localized name of one biome id, or its formatted label when the
    /// localizer has no entry.
    fn display_name(&self, id: &str, locale: &str) -> String {
        let id = id.trim();
        let (namespace, path) = match id.split_once(':') {
            Some((namespace, _)) => (namespace, strip_namespace(id)),
            None => (DEFAULT_NAMESPACE, id),
        };
        let key = format!("biome.{}.{}", namespace, path.replace('/', "."));
        let localized = self.localizer.localize(&key, locale);
        if localized.is_empty() || localized == key {
            format_label(id)
        } else {
            localized
        }
    }

    /// Number of cached `(tag, locale)` entries.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{MemoryTagRegistry, NoLiveSource};
    use dex_core::IdentityLocalizer;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Dictionary(HashMap<(String, String), String>);

    impl Localizer for Dictionary {
        fn localize(&self, key: &str, locale: &str) -> String {
            self.0
                .get(&(key.to_string(), locale.to_string()))
                .cloned()
                .unwrap_or_else(|| key.to_string())
        }
    }

    struct Counting(AtomicUsize);

    impl TagRegistry for Counting {
        fn members(&self, _tag: &str) -> Option<Vec<String>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    #[test]
    fn members_are_labelled_sorted_and_unique() {
        let registry = MemoryTagRegistry::new().with_tag(
            "#c:is_forest",
            ["minecraft:dark_forest", "minecraft:birch_forest", "minecraft:dark_forest"],
        );
        let cache = TagResolutionCache::new(Arc::new(registry), Arc::new(IdentityLocalizer));

        let names = cache.resolve("#c:is_forest", "en_us");
        assert_eq!(&names[..], ["Birch Forest", "Dark Forest"]);
        assert!(Arc::ptr_eq(&names, &cache.resolve("c:is_forest", "en_us")));
    }

    #[test]
    fn localized_names_are_per_locale() {
        let registry = MemoryTagRegistry::new().with_tag("c:is_hot", ["minecraft:desert"]);
        let dictionary = Dictionary(HashMap::from([(
            ("biome.minecraft.desert".to_string(), "de_de".to_string()),
            "Wüste".to_string(),
        )]));
        let cache = TagResolutionCache::new(Arc::new(registry), Arc::new(dictionary));

        assert_eq!(&cache.resolve("c:is_hot", "de_de")[..], ["Wüste"]);
        assert_eq!(&cache.resolve("c:is_hot", "en_us")[..], ["Desert"]);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn unavailable_registry_caches_empty() {
        let registry = Arc::new(Counting(AtomicUsize::new(0)));
        let cache = TagResolutionCache::new(registry.clone(), Arc::new(IdentityLocalizer));

        assert!(cache.resolve("c:is_ocean", "en_us").is_empty());
        assert!(cache.resolve("c:is_ocean", "en_us").is_empty());
        assert_eq!(registry.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn absent_host_has_no_members() {
        let cache = TagResolutionCache::new(Arc::new(NoLiveSource), Arc::new(IdentityLocalizer));
        assert!(cache.resolve("c:is_ocean", "en_us").is_empty());
    }
}
