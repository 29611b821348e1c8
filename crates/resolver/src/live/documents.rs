//! Live adapter traits implemented for the static document formats.

use std::sync::Arc;

use dex_content::{
    ConditionDocument, MultiplierDocument, SpawnRuleDocument, SpeciesDocument, StaticLibrary,
};
use dex_core::{
    AbilitySlot, DropEntry, EvYield, FieldError, FieldResult, LearnsetEntry, LevelRange,
};

use super::{LiveBiomeRef, LiveCondition, LiveMultiplier, LiveSpawnRecord, LiveSpecies};

impl LiveCondition for ConditionDocument {
    fn biomes(&self) -> FieldResult<Vec<LiveBiomeRef>> {
        Ok(ConditionDocument::biomes(self)?
            .iter()
            .map(|raw| LiveBiomeRef::from_encoded(raw))
            .collect())
    }

    fn time_range(&self) -> FieldResult<Option<String>> {
        ConditionDocument::time_range(self)
    }

    fn is_raining(&self) -> FieldResult<Option<bool>> {
        ConditionDocument::is_raining(self)
    }

    fn is_thundering(&self) -> FieldResult<Option<bool>> {
        ConditionDocument::is_thundering(self)
    }

    fn can_see_sky(&self) -> FieldResult<Option<bool>> {
        ConditionDocument::can_see_sky(self)
    }

    fn y_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Ok((bound(self.min_y()), bound(self.max_y())))
    }

    fn light_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Ok((bound(self.min_light()), bound(self.max_light())))
    }

    fn sky_light_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Ok((bound(self.min_sky_light()), bound(self.max_sky_light())))
    }

    fn moon_phase(&self) -> FieldResult<Option<u8>> {
        ConditionDocument::moon_phase(self)
    }

    fn structures(&self) -> FieldResult<Vec<String>> {
        ConditionDocument::structures(self)
    }

    fn nearby_blocks(&self) -> FieldResult<Vec<String>> {
        self.needed_nearby_blocks()
    }

    fn base_blocks(&self) -> FieldResult<Vec<String>> {
        self.needed_base_blocks()
    }

    fn min_lure_level(&self) -> FieldResult<Option<u32>> {
        ConditionDocument::min_lure_level(self)
    }
}

/// One side of a bounds pair; a mistyped side leaves only that side open.
fn bound(result: FieldResult<Option<i32>>) -> Option<i32> {
    result.unwrap_or_else(|e| {
        tracing::trace!(field = e.field(), "Bound unavailable: {}", e);
        None
    })
}

fn list_or_empty<T>(result: FieldResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::trace!(field = e.field(), "Field unavailable: {}", e);
        Vec::new()
    })
}

fn boxed(conditions: Vec<ConditionDocument>) -> Vec<Box<dyn LiveCondition>> {
    conditions
        .into_iter()
        .map(|c| Box::new(c) as Box<dyn LiveCondition>)
        .collect()
}

fn multiplier_record(doc: MultiplierDocument) -> LiveMultiplier {
    LiveMultiplier {
        multiplier: doc.multiplier(),
        condition: doc
            .condition()
            .map(|c| c.map(|c| Box::new(c) as Box<dyn LiveCondition>)),
    }
}

impl LiveSpawnRecord for SpawnRuleDocument {
    fn species(&self) -> FieldResult<String> {
        let (species, _) = self.species_and_form()?;
        if species.is_empty() {
            return Err(FieldError::Missing("pokemon"));
        }
        Ok(species)
    }

    fn form(&self) -> FieldResult<Option<String>> {
        Ok(self.species_and_form()?.1)
    }

    fn id(&self) -> FieldResult<Option<String>> {
        SpawnRuleDocument::id(self)
    }

    fn presets(&self) -> FieldResult<Vec<String>> {
        SpawnRuleDocument::presets(self)
    }

    fn context(&self) -> FieldResult<Option<String>> {
        SpawnRuleDocument::context(self)
    }

    fn bucket(&self) -> FieldResult<Option<String>> {
        SpawnRuleDocument::bucket(self)
    }

    fn level(&self) -> FieldResult<Option<LevelRange>> {
        SpawnRuleDocument::level(self)
    }

    fn weight(&self) -> FieldResult<Option<f32>> {
        SpawnRuleDocument::weight(self)
    }

    fn conditions(&self) -> FieldResult<Vec<Box<dyn LiveCondition>>> {
        Ok(boxed(SpawnRuleDocument::conditions(self)?))
    }

    fn anticonditions(&self) -> FieldResult<Vec<Box<dyn LiveCondition>>> {
        Ok(boxed(SpawnRuleDocument::anticonditions(self)?))
    }

    /// The single `weightMultiplier` followed by the `weightMultipliers` list.
    /// Each is read on its own; the error surfaces only when both fail.
    fn weight_multipliers(&self) -> FieldResult<Vec<LiveMultiplier>> {
        let all = match (
            self.weight_multiplier(),
            SpawnRuleDocument::weight_multipliers(self),
        ) {
            (Err(single), Err(_)) => return Err(single),
            (single, list) => {
                let mut all = list_or_empty(single);
                all.extend(list_or_empty(list));
                all
            }
        };
        Ok(all.into_iter().map(multiplier_record).collect())
    }
}

/// A species document of a loaded [`StaticLibrary`], addressed by id.
#[derive(Clone, Debug)]
pub struct StaticSpecies {
    library: Arc<StaticLibrary>,
    id: String,
}

impl StaticSpecies {
    pub fn new(library: Arc<StaticLibrary>, id: impl Into<String>) -> Self {
        Self {
            library,
            id: id.into(),
        }
    }

    /// Every species of a library, in id order.
    pub fn all(library: &Arc<StaticLibrary>) -> Vec<Arc<dyn LiveSpecies>> {
        library
            .species_documents()
            .map(|(id, _)| Arc::new(Self::new(Arc::clone(library), id)) as Arc<dyn LiveSpecies>)
            .collect()
    }

    fn doc(&self) -> FieldResult<&SpeciesDocument> {
        self.library
            .species(&self.id)
            .ok_or(FieldError::Missing("species"))
    }
}

impl LiveSpecies for StaticSpecies {
    fn id(&self) -> FieldResult<String> {
        Ok(self.id.clone())
    }

    fn ordinal(&self) -> FieldResult<Option<u32>> {
        Ok(self.doc()?.national_pokedex_number)
    }

    fn abilities(&self) -> FieldResult<Vec<AbilitySlot>> {
        Ok(self.doc()?.abilities())
    }

    fn learnset(&self) -> FieldResult<Vec<LearnsetEntry>> {
        Ok(self.doc()?.learnset())
    }

    fn drops(&self) -> FieldResult<Vec<DropEntry>> {
        Ok(self.doc()?.drops())
    }

    fn egg_groups(&self) -> FieldResult<Vec<String>> {
        Ok(self.doc()?.egg_groups())
    }

    fn ev_yield(&self) -> FieldResult<Option<EvYield>> {
        let ev = self.doc()?.ev_yield();
        Ok((!ev.is_empty()).then_some(ev))
    }

    fn pre_evolution(&self) -> FieldResult<Option<String>> {
        Ok(self.doc()?.pre_evolution())
    }

    fn evolution_targets(&self) -> FieldResult<Vec<String>> {
        Ok(self
            .doc()?
            .evolution_edges()
            .into_iter()
            .map(|edge| edge.target)
            .collect())
    }
}
