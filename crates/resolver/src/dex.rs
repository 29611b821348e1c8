//! The query facade.
//!
//! [`Dex`] owns every resolver, index and cache and answers the public
//! queries. Nothing here returns an error: a source that is absent or
//! malformed yields empty answers, and the reason is available through
//! [`Dex::last_error`] and [`Dex::status`].

use std::sync::Arc;
use std::time::Duration;

use dex_content::{DirectorySource, DocumentSource, MemorySource, StaticLibrary};
use dex_core::{
    AbilityBearer, EvYield, EvoNode, FieldResult, IdentityLocalizer, ItemDropper, LearnsetEntry,
    Localizer, MoveLearner, SpawnCondition, SpawnKey, SpeciesCatalog, StaticCatalog, normalize_id,
};
use serde::Serialize;

use crate::config::DexConfig;
use crate::error::DexError;
use crate::evolution::EvolutionGraphResolver;
use crate::index::ReverseIndexBuilder;
use crate::library::SharedLibrary;
use crate::live::{LiveSource, LiveSpecies, NoLiveSource, StaticSpecies, TagRegistry};
use crate::relations::{
    SpeciesHandle, ability_pairs, drop_pairs, forward_map, live_species, live_spawns, move_pairs,
    non_empty, static_spawns,
};
use crate::resolver::{DualSourceResolver, LoadState, SourceKind};
use crate::tags::TagResolutionCache;

/// Lazily populated data sets, for status queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DataKind {
    StaticLibrary,
    Spawns,
    EggGroups,
    EvYields,
    MoveCatalog,
    MoveIndex,
    AbilityIndex,
    DropIndex,
}

impl DataKind {
    pub const ALL: [DataKind; 8] = [
        DataKind::StaticLibrary,
        DataKind::Spawns,
        DataKind::EggGroups,
        DataKind::EvYields,
        DataKind::MoveCatalog,
        DataKind::MoveIndex,
        DataKind::AbilityIndex,
        DataKind::DropIndex,
    ];
}

/// Point-in-time state of one data set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub kind: DataKind,
    pub state: LoadState,
    /// Where the data came from; indices and the library report none.
    pub source: Option<SourceKind>,
    pub entries: usize,
    pub error: Option<String>,
}

type Resolver<K, T> = Arc<DualSourceResolver<K, T>>;
type Index<V> = Arc<ReverseIndexBuilder<String, V>>;

pub struct Dex {
    config: DexConfig,
    live: Arc<dyn LiveSource>,
    catalog: Arc<dyn SpeciesCatalog>,
    library: Arc<SharedLibrary>,
    spawns: Resolver<SpawnKey, Vec<SpawnCondition>>,
    egg_groups: Resolver<String, Vec<String>>,
    ev_yields: Resolver<String, EvYield>,
    move_catalog: Resolver<String, Vec<LearnsetEntry>>,
    move_index: Index<MoveLearner>,
    ability_index: Index<AbilityBearer>,
    drop_index: Index<ItemDropper>,
    evolution: EvolutionGraphResolver,
    tags: TagResolutionCache,
}

impl Dex {
    pub fn builder() -> DexBuilder {
        DexBuilder::new()
    }

    pub fn config(&self) -> &DexConfig {
        &self.config
    }

    /// Every spawn condition of a species.
    ///
    /// Without a form, conditions of the base form come first, followed by
    /// each form in name order. With a form, only that form's conditions are
    /// returned. Loads the spawn data on first use.
    pub fn resolve_spawn_conditions(&self, entity: &str, form: Option<&str>) -> Vec<SpawnCondition> {
        self.spawns.ensure_loaded();

        if let Some(form) = form {
            return self
                .spawns
                .get(&SpawnKey::new(entity, Some(form)))
                .cloned()
                .unwrap_or_default();
        }

        let species = normalize_id(entity);
        let mut matching: Vec<_> = self
            .spawns
            .entries()
            .filter(|(key, _)| key.species == species)
            .collect();
        matching.sort_by(|(a, _), (b, _)| a.form.cmp(&b.form));
        matching
            .into_iter()
            .flat_map(|(_, conditions)| conditions.iter().cloned())
            .collect()
    }

    /// Species learning a move, in ordinal order. Empty until the move
    /// index is ready; the first call starts the build.
    pub fn learners_of(&self, move_id: &str) -> Vec<MoveLearner> {
        self.trigger_move_index();
        self.move_index.get(&normalize_id(move_id)).to_vec()
    }

    /// Species that can have an ability. Empty until the ability index is
    /// ready; the first call starts the build.
    pub fn bearers_of(&self, ability: &str) -> Vec<AbilityBearer> {
        self.trigger_ability_index();
        self.ability_index.get(&normalize_id(ability)).to_vec()
    }

    /// Species dropping an item. Empty until the drop index is ready; the
    /// first call starts the build.
    pub fn droppers_of(&self, item: &str) -> Vec<ItemDropper> {
        self.trigger_drop_index();
        self.drop_index.get(&normalize_id(item)).to_vec()
    }

    pub fn evolution_tree_of(&self, entity: &str) -> Option<Arc<EvoNode>> {
        self.evolution.tree_of(entity)
    }

    /// Display names of a biome tag's members in `locale`, sorted.
    pub fn resolve_tag(&self, tag: &str, locale: &str) -> Arc<[String]> {
        self.tags.resolve(tag, locale)
    }

    /// [`resolve_tag`](Self::resolve_tag) in the configured locale.
    pub fn resolve_tag_default(&self, tag: &str) -> Arc<[String]> {
        self.tags.resolve(tag, &self.config.locale)
    }

    pub fn egg_groups_of(&self, entity: &str) -> Vec<String> {
        self.egg_groups.ensure_loaded();
        self.egg_groups
            .get(&normalize_id(entity))
            .cloned()
            .unwrap_or_default()
    }

    pub fn ev_yield_of(&self, entity: &str) -> Option<EvYield> {
        self.ev_yields.ensure_loaded();
        self.ev_yields.get(&normalize_id(entity)).copied()
    }

    /// Forward move catalog of a species.
    pub fn moves_of(&self, entity: &str) -> Vec<LearnsetEntry> {
        self.move_catalog.ensure_loaded();
        self.move_catalog
            .get(&normalize_id(entity))
            .cloned()
            .unwrap_or_default()
    }

    /// Starts every background build that has not started yet.
    pub fn warm_up(&self) {
        tracing::debug!("Warming up all data sets");
        self.spawns.spawn_load();
        self.egg_groups.spawn_load();
        self.ev_yields.spawn_load();
        self.move_catalog.spawn_load();
        self.trigger_move_index();
        self.trigger_ability_index();
        self.trigger_drop_index();
    }

    /// Blocks the current thread until `kind` is loaded or `timeout` passes.
    ///
    /// Does not start any load by itself.
    pub fn wait_for(&self, kind: DataKind, timeout: Duration) -> bool {
        let step = Duration::from_millis(10);
        let mut waited = Duration::ZERO;
        while !self.is_loaded(kind) {
            if waited >= timeout {
                return false;
            }
            std::thread::sleep(step);
            waited += step;
        }
        true
    }

    /// Async variant of [`wait_for`](Self::wait_for).
    pub async fn ready(&self, kind: DataKind, timeout: Duration) -> bool {
        let step = Duration::from_millis(10);
        let mut waited = Duration::ZERO;
        while !self.is_loaded(kind) {
            if waited >= timeout {
                return false;
            }
            tokio::time::sleep(step).await;
            waited += step;
        }
        true
    }

    pub fn is_loaded(&self, kind: DataKind) -> bool {
        match kind {
            DataKind::StaticLibrary => self.library.is_loaded(),
            DataKind::Spawns => self.spawns.is_loaded(),
            DataKind::EggGroups => self.egg_groups.is_loaded(),
            DataKind::EvYields => self.ev_yields.is_loaded(),
            DataKind::MoveCatalog => self.move_catalog.is_loaded(),
            DataKind::MoveIndex => self.move_index.is_ready(),
            DataKind::AbilityIndex => self.ability_index.is_ready(),
            DataKind::DropIndex => self.drop_index.is_ready(),
        }
    }

    pub fn last_error(&self, kind: DataKind) -> Option<String> {
        let error: Option<&DexError> = match kind {
            DataKind::StaticLibrary => self.library.last_error(),
            DataKind::Spawns => self.spawns.last_error(),
            DataKind::EggGroups => self.egg_groups.last_error(),
            DataKind::EvYields => self.ev_yields.last_error(),
            DataKind::MoveCatalog => self.move_catalog.last_error(),
            DataKind::MoveIndex => self.move_index.last_error(),
            DataKind::AbilityIndex => self.ability_index.last_error(),
            DataKind::DropIndex => self.drop_index.last_error(),
        };
        error.map(ToString::to_string)
    }

    pub fn status(&self) -> Vec<SourceStatus> {
        DataKind::ALL
            .into_iter()
            .map(|kind| self.status_of(kind))
            .collect()
    }

    fn status_of(&self, kind: DataKind) -> SourceStatus {
        fn index_state(ready: bool) -> LoadState {
            if ready { LoadState::Loaded } else { LoadState::Unloaded }
        }

        let (state, source, entries) = match kind {
            DataKind::StaticLibrary => {
                let loaded = self.library.is_loaded();
                let entries = if loaded { self.library.get().species_count() } else { 0 };
                (index_state(loaded), None, entries)
            }
            DataKind::Spawns => (self.spawns.state(), self.spawns.source(), self.spawns.len()),
            DataKind::EggGroups => (
                self.egg_groups.state(),
                self.egg_groups.source(),
                self.egg_groups.len(),
            ),
            DataKind::EvYields => (
                self.ev_yields.state(),
                self.ev_yields.source(),
                self.ev_yields.len(),
            ),
            DataKind::MoveCatalog => (
                self.move_catalog.state(),
                self.move_catalog.source(),
                self.move_catalog.len(),
            ),
            DataKind::MoveIndex => (index_state(self.move_index.is_ready()), None, self.move_index.len()),
            DataKind::AbilityIndex => (
                index_state(self.ability_index.is_ready()),
                None,
                self.ability_index.len(),
            ),
            DataKind::DropIndex => (index_state(self.drop_index.is_ready()), None, self.drop_index.len()),
        };

        SourceStatus {
            kind,
            state,
            source,
            entries,
            error: self.last_error(kind),
        }
    }

    /// Live species, or an empty list when the host cannot be queried.
    fn live_entities(live: &Arc<dyn LiveSource>) -> Vec<SpeciesHandle> {
        live_species(live.as_ref()).unwrap_or_else(|e| {
            tracing::debug!("{}", e);
            Vec::new()
        })
    }

    fn trigger_move_index(&self) {
        let (live, library) = (Arc::clone(&self.live), Arc::clone(&self.library));
        let catalog = Arc::clone(&self.catalog);
        self.move_index.trigger_with_fallback(
            move || Self::live_entities(&live),
            move || StaticSpecies::all(&library.get()),
            move |species: &SpeciesHandle| move_pairs(catalog.as_ref(), species),
        );
    }

    fn trigger_ability_index(&self) {
        let (live, library) = (Arc::clone(&self.live), Arc::clone(&self.library));
        let catalog = Arc::clone(&self.catalog);
        self.ability_index.trigger_with_fallback(
            move || Self::live_entities(&live),
            move || StaticSpecies::all(&library.get()),
            move |species: &SpeciesHandle| ability_pairs(catalog.as_ref(), species),
        );
    }

    fn trigger_drop_index(&self) {
        let (live, library) = (Arc::clone(&self.live), Arc::clone(&self.library));
        let catalog = Arc::clone(&self.catalog);
        self.drop_index.trigger_with_fallback(
            move || Self::live_entities(&live),
            move || StaticSpecies::all(&library.get()),
            move |species: &SpeciesHandle| drop_pairs(catalog.as_ref(), species),
        );
    }
}

/// Builder for [`Dex`].
///
/// Every collaborator is optional: without a live source the layer runs on
/// static documents only, and without a document source it reads
/// `config.data_dir` (or nothing).
pub struct DexBuilder {
    config: DexConfig,
    live: Option<Arc<dyn LiveSource>>,
    tag_registry: Option<Arc<dyn TagRegistry>>,
    catalog: Option<Arc<dyn SpeciesCatalog>>,
    localizer: Option<Arc<dyn Localizer>>,
    documents: Option<Arc<dyn DocumentSource>>,
    library: Option<StaticLibrary>,
}

impl DexBuilder {
    fn new() -> Self {
        Self {
            config: DexConfig::default(),
            live: None,
            tag_registry: None,
            catalog: None,
            localizer: None,
            documents: None,
            library: None,
        }
    }

    /// Override configuration
    pub fn config(mut self, config: DexConfig) -> Self {
        self.config = config;
        self
    }

    /// Start background builds on [`build`](Self::build)
    pub fn background(mut self, enable: bool) -> Self {
        self.config.background = enable;
        self
    }

    /// Set the host's live object graph adapter
    pub fn live_source(mut self, live: impl LiveSource + 'static) -> Self {
        self.live = Some(Arc::new(live));
        self
    }

    pub fn live_source_arc(mut self, live: Arc<dyn LiveSource>) -> Self {
        self.live = Some(live);
        self
    }

    pub fn tag_registry(mut self, registry: impl TagRegistry + 'static) -> Self {
        self.tag_registry = Some(Arc::new(registry));
        self
    }

    pub fn catalog(mut self, catalog: impl SpeciesCatalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    pub fn localizer(mut self, localizer: impl Localizer + 'static) -> Self {
        self.localizer = Some(Arc::new(localizer));
        self
    }

    /// Read static documents from `source` instead of `config.data_dir`
    pub fn documents(mut self, source: impl DocumentSource + 'static) -> Self {
        self.documents = Some(Arc::new(source));
        self
    }

    /// Use an already parsed static library
    pub fn static_library(mut self, library: StaticLibrary) -> Self {
        self.library = Some(library);
        self
    }

    pub fn build(self) -> Dex {
        let live = self.live.unwrap_or_else(|| Arc::new(NoLiveSource));
        let tag_registry = self.tag_registry.unwrap_or_else(|| Arc::new(NoLiveSource));
        let catalog = self.catalog.unwrap_or_else(|| Arc::new(StaticCatalog::new()));
        let localizer = self.localizer.unwrap_or_else(|| Arc::new(IdentityLocalizer));

        let library = Arc::new(match (self.library, self.documents, &self.config.data_dir) {
            (Some(library), _, _) => SharedLibrary::preloaded(library),
            (None, Some(documents), _) => SharedLibrary::new(documents),
            (None, None, Some(dir)) => SharedLibrary::new(Arc::new(DirectorySource::new(dir))),
            (None, None, None) => {
                tracing::info!("No data directory configured; static documents are empty");
                SharedLibrary::new(Arc::new(MemorySource::new()))
            }
        });

        let dex = Dex {
            spawns: Arc::new(DualSourceResolver::new(
                "spawns",
                {
                    let live = Arc::clone(&live);
                    move || live_spawns(live.as_ref())
                },
                {
                    let library = Arc::clone(&library);
                    move || {
                        let library = library.require()?;
                        Ok(static_spawns(&library))
                    }
                },
            )),
            egg_groups: species_resolver("egg_groups", &live, &library, |s| {
                Ok(non_empty(s.egg_groups()?))
            }),
            ev_yields: species_resolver("ev_yields", &live, &library, |s| {
                Ok(s.ev_yield()?.filter(|ev| !ev.is_empty()))
            }),
            move_catalog: species_resolver("move_catalog", &live, &library, |s| {
                Ok(non_empty(s.learnset()?))
            }),
            move_index: Arc::new(ReverseIndexBuilder::new("move_index")),
            ability_index: Arc::new(ReverseIndexBuilder::new("ability_index")),
            drop_index: Arc::new(ReverseIndexBuilder::new("drop_index")),
            evolution: EvolutionGraphResolver::new(Arc::clone(&live), Arc::clone(&library)),
            tags: TagResolutionCache::new(tag_registry, localizer),
            config: self.config,
            live,
            catalog,
            library,
        };

        if dex.config.background {
            dex.warm_up();
        }
        dex
    }
}

/// A per-species forward resolver over live species, then static documents.
fn species_resolver<T>(
    name: &'static str,
    live: &Arc<dyn LiveSource>,
    library: &Arc<SharedLibrary>,
    read: fn(&dyn LiveSpecies) -> FieldResult<Option<T>>,
) -> Resolver<String, T>
where
    T: Send + Sync + 'static,
{
    let live = Arc::clone(live);
    let library = Arc::clone(library);
    Arc::new(DualSourceResolver::new(
        name,
        move || Ok(forward_map(&live_species(live.as_ref())?, read)),
        move || Ok(forward_map(&StaticSpecies::all(&library.require()?), read)),
    ))
}
