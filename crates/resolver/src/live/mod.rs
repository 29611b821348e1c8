//! Adapter traits over the host's runtime object graph.
//!
//! The host registers spawn rules and species at runtime, with no stable
//! schema. Every accessor is fallible and defaults to
//! [`FieldError::Unsupported`], so an adapter only implements what its host
//! actually exposes and the normalizer degrades each missing attribute on its
//! own.
//!
//! The static document types implement the same traits (see [`documents`]),
//! which gives both sources a single normalization and extraction path.
mod documents;
mod memory;

use std::sync::Arc;

use dex_core::{
    AbilitySlot, BiomeClause, DropEntry, EvYield, FieldError, FieldResult, LearnsetEntry,
    LevelRange,
};

pub use documents::StaticSpecies;
pub use memory::{
    LiveConditionEntry, LiveMultiplierEntry, LiveSpawnEntry, LiveSpeciesEntry, MemoryLiveSource,
    MemoryTagRegistry,
};

/// A biome reference as the host reports it.
///
/// The adapter tells tags from single biomes by inspecting the runtime
/// object; anything it cannot classify is `Unrecognized` and skipped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LiveBiomeRef {
    Tag(String),
    Id(String),
    Unrecognized(String),
}

impl LiveBiomeRef {
    /// Classifies the static string encoding (`#ns:tag` or `ns:id`).
    pub fn from_encoded(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.strip_prefix('#') {
            Some(tag) if !tag.is_empty() => Self::Tag(tag.to_string()),
            Some(_) => Self::Unrecognized(raw.to_string()),
            None if raw.is_empty() => Self::Unrecognized(String::new()),
            None => Self::Id(raw.to_string()),
        }
    }

    pub fn into_clause(self) -> Option<BiomeClause> {
        match self {
            Self::Tag(tag) => Some(BiomeClause::tag(&tag)),
            Self::Id(id) => Some(BiomeClause::direct(&id)),
            Self::Unrecognized(_) => None,
        }
    }
}

/// One spawn condition (or anticondition) record.
pub trait LiveCondition: Send + Sync {
    fn biomes(&self) -> FieldResult<Vec<LiveBiomeRef>> {
        Err(FieldError::Unsupported("biomes"))
    }

    fn time_range(&self) -> FieldResult<Option<String>> {
        Err(FieldError::Unsupported("timeRange"))
    }

    fn is_raining(&self) -> FieldResult<Option<bool>> {
        Err(FieldError::Unsupported("isRaining"))
    }

    fn is_thundering(&self) -> FieldResult<Option<bool>> {
        Err(FieldError::Unsupported("isThundering"))
    }

    fn can_see_sky(&self) -> FieldResult<Option<bool>> {
        Err(FieldError::Unsupported("canSeeSky"))
    }

    fn y_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Err(FieldError::Unsupported("minY/maxY"))
    }

    fn light_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Err(FieldError::Unsupported("minLight/maxLight"))
    }

    fn sky_light_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Err(FieldError::Unsupported("minSkyLight/maxSkyLight"))
    }

    fn moon_phase(&self) -> FieldResult<Option<u8>> {
        Err(FieldError::Unsupported("moonPhase"))
    }

    fn structures(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::Unsupported("structures"))
    }

    fn nearby_blocks(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::Unsupported("neededNearbyBlocks"))
    }

    fn base_blocks(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::Unsupported("neededBaseBlocks"))
    }

    fn min_lure_level(&self) -> FieldResult<Option<u32>> {
        Err(FieldError::Unsupported("minLureLevel"))
    }
}

/// A weight multiplier record; both parts are read independently.
pub struct LiveMultiplier {
    pub multiplier: FieldResult<Option<f32>>,
    pub condition: FieldResult<Option<Box<dyn LiveCondition>>>,
}

/// One spawn rule. Only [`species`](Self::species) is required.
pub trait LiveSpawnRecord: Send + Sync {
    fn species(&self) -> FieldResult<String>;

    fn form(&self) -> FieldResult<Option<String>> {
        Ok(None)
    }

    fn id(&self) -> FieldResult<Option<String>> {
        Err(FieldError::Unsupported("id"))
    }

    fn presets(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::Unsupported("presets"))
    }

    fn context(&self) -> FieldResult<Option<String>> {
        Err(FieldError::Unsupported("context"))
    }

    fn bucket(&self) -> FieldResult<Option<String>> {
        Err(FieldError::Unsupported("bucket"))
    }

    fn level(&self) -> FieldResult<Option<LevelRange>> {
        Err(FieldError::Unsupported("level"))
    }

    fn weight(&self) -> FieldResult<Option<f32>> {
        Err(FieldError::Unsupported("weight"))
    }

    /// Alternative conditions; any one of them allows the spawn.
    fn conditions(&self) -> FieldResult<Vec<Box<dyn LiveCondition>>> {
        Err(FieldError::Unsupported("condition"))
    }

    fn anticonditions(&self) -> FieldResult<Vec<Box<dyn LiveCondition>>> {
        Err(FieldError::Unsupported("anticondition"))
    }

    fn weight_multipliers(&self) -> FieldResult<Vec<LiveMultiplier>> {
        Err(FieldError::Unsupported("weightMultipliers"))
    }
}

/// Per-species forward relations.
pub trait LiveSpecies: Send + Sync {
    fn id(&self) -> FieldResult<String>;

    /// The species' own dex number, used when the catalog does not know it.
    fn ordinal(&self) -> FieldResult<Option<u32>> {
        Ok(None)
    }

    fn abilities(&self) -> FieldResult<Vec<AbilitySlot>> {
        Err(FieldError::Unsupported("abilities"))
    }

    fn learnset(&self) -> FieldResult<Vec<LearnsetEntry>> {
        Err(FieldError::Unsupported("moves"))
    }

    fn drops(&self) -> FieldResult<Vec<DropEntry>> {
        Err(FieldError::Unsupported("drops"))
    }

    fn egg_groups(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::Unsupported("eggGroups"))
    }

    fn ev_yield(&self) -> FieldResult<Option<EvYield>> {
        Err(FieldError::Unsupported("evYield"))
    }

    fn pre_evolution(&self) -> FieldResult<Option<String>> {
        Err(FieldError::Unsupported("preEvolution"))
    }

    /// Ids this species evolves into. The live graph carries no
    /// requirement data, only targets.
    fn evolution_targets(&self) -> FieldResult<Vec<String>> {
        Err(FieldError::Unsupported("evolutions"))
    }
}

/// Entry point of the host's object graph.
///
/// An `Err` means the host could not be queried at all; callers treat it
/// like an empty source.
pub trait LiveSource: Send + Sync {
    fn spawn_records(&self) -> FieldResult<Vec<Arc<dyn LiveSpawnRecord>>>;

    fn species(&self) -> FieldResult<Vec<Arc<dyn LiveSpecies>>>;
}

/// Expands biome tags into member biome ids.
pub trait TagRegistry: Send + Sync {
    /// `None` when the registry is not available.
    fn members(&self, tag: &str) -> Option<Vec<String>>;
}

/// Stand-in for a host that is not running.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLiveSource;

impl LiveSource for NoLiveSource {
    fn spawn_records(&self) -> FieldResult<Vec<Arc<dyn LiveSpawnRecord>>> {
        Ok(Vec::new())
    }

    fn species(&self) -> FieldResult<Vec<Arc<dyn LiveSpecies>>> {
        Ok(Vec::new())
    }
}

impl TagRegistry for NoLiveSource {
    fn members(&self, _tag: &str) -> Option<Vec<String>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_biome_refs() {
        assert_eq!(
            LiveBiomeRef::from_encoded("#c:is_forest"),
            LiveBiomeRef::Tag("c:is_forest".into())
        );
        assert_eq!(
            LiveBiomeRef::from_encoded(" minecraft:plains "),
            LiveBiomeRef::Id("minecraft:plains".into())
        );
        assert!(matches!(
            LiveBiomeRef::from_encoded("#"),
            LiveBiomeRef::Unrecognized(_)
        ));
        assert!(LiveBiomeRef::Unrecognized("x".into()).into_clause().is_none());
    }

    #[test]
    fn unsupported_accessors_default_to_errors() {
        struct Bare;
        impl LiveCondition for Bare {}

        assert_eq!(Bare.biomes(), Err(FieldError::Unsupported("biomes")));
        assert!(Bare.moon_phase().is_err());
    }
}
