//! Plain-struct live source for embedding and tests.

use std::collections::HashMap;
use std::sync::Arc;

use dex_core::{
    AbilitySlot, DropEntry, EvYield, FieldError, FieldResult, LearnsetEntry, LevelRange,
};

use super::{
    LiveBiomeRef, LiveCondition, LiveMultiplier, LiveSource, LiveSpawnRecord, LiveSpecies,
    TagRegistry,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveConditionEntry {
    pub biomes: Vec<LiveBiomeRef>,
    pub time_range: Option<String>,
    pub is_raining: Option<bool>,
    pub is_thundering: Option<bool>,
    pub can_see_sky: Option<bool>,
    pub min_y: Option<i32>,
    pub max_y: Option<i32>,
    pub min_light: Option<i32>,
    pub max_light: Option<i32>,
    pub min_sky_light: Option<i32>,
    pub max_sky_light: Option<i32>,
    pub moon_phase: Option<u8>,
    pub structures: Vec<String>,
    pub nearby_blocks: Vec<String>,
    pub base_blocks: Vec<String>,
    pub min_lure_level: Option<u32>,
}

impl LiveCondition for LiveConditionEntry {
    fn biomes(&self) -> FieldResult<Vec<LiveBiomeRef>> {
        Ok(self.biomes.clone())
    }

    fn time_range(&self) -> FieldResult<Option<String>> {
        Ok(self.time_range.clone())
    }

    fn is_raining(&self) -> FieldResult<Option<bool>> {
        Ok(self.is_raining)
    }

    fn is_thundering(&self) -> FieldResult<Option<bool>> {
        Ok(self.is_thundering)
    }

    fn can_see_sky(&self) -> FieldResult<Option<bool>> {
        Ok(self.can_see_sky)
    }

    fn y_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Ok((self.min_y, self.max_y))
    }

    fn light_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Ok((self.min_light, self.max_light))
    }

    fn sky_light_bounds(&self) -> FieldResult<(Option<i32>, Option<i32>)> {
        Ok((self.min_sky_light, self.max_sky_light))
    }

    fn moon_phase(&self) -> FieldResult<Option<u8>> {
        Ok(self.moon_phase)
    }

    fn structures(&self) -> FieldResult<Vec<String>> {
        Ok(self.structures.clone())
    }

    fn nearby_blocks(&self) -> FieldResult<Vec<String>> {
        Ok(self.nearby_blocks.clone())
    }

    fn base_blocks(&self) -> FieldResult<Vec<String>> {
        Ok(self.base_blocks.clone())
    }

    fn min_lure_level(&self) -> FieldResult<Option<u32>> {
        Ok(self.min_lure_level)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveMultiplierEntry {
    pub multiplier: f32,
    pub condition: Option<LiveConditionEntry>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveSpawnEntry {
    pub species: String,
    pub form: Option<String>,
    pub id: Option<String>,
    pub presets: Vec<String>,
    pub context: Option<String>,
    pub bucket: Option<String>,
    pub level: Option<LevelRange>,
    pub weight: Option<f32>,
    pub conditions: Vec<LiveConditionEntry>,
    pub anticonditions: Vec<LiveConditionEntry>,
    pub multipliers: Vec<LiveMultiplierEntry>,
}

impl LiveSpawnEntry {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            ..Self::default()
        }
    }
}

fn boxed(conditions: &[LiveConditionEntry]) -> Vec<Box<dyn LiveCondition>> {
    conditions
        .iter()
        .map(|c| Box::new(c.clone()) as Box<dyn LiveCondition>)
        .collect()
}

impl LiveSpawnRecord for LiveSpawnEntry {
    fn species(&self) -> FieldResult<String> {
        if self.species.trim().is_empty() {
            return Err(FieldError::Missing("species"));
        }
        Ok(self.species.clone())
    }

    fn form(&self) -> FieldResult<Option<String>> {
        Ok(self.form.clone())
    }

    fn id(&self) -> FieldResult<Option<String>> {
        Ok(self.id.clone())
    }

    fn presets(&self) -> FieldResult<Vec<String>> {
        Ok(self.presets.clone())
    }

    fn context(&self) -> FieldResult<Option<String>> {
        Ok(self.context.clone())
    }

    fn bucket(&self) -> FieldResult<Option<String>> {
        Ok(self.bucket.clone())
    }

    fn level(&self) -> FieldResult<Option<LevelRange>> {
        Ok(self.level)
    }

    fn weight(&self) -> FieldResult<Option<f32>> {
        Ok(self.weight)
    }

    fn conditions(&self) -> FieldResult<Vec<Box<dyn LiveCondition>>> {
        Ok(boxed(&self.conditions))
    }

    fn anticonditions(&self) -> FieldResult<Vec<Box<dyn LiveCondition>>> {
        Ok(boxed(&self.anticonditions))
    }

    fn weight_multipliers(&self) -> FieldResult<Vec<LiveMultiplier>> {
        Ok(self
            .multipliers
            .iter()
            .map(|m| LiveMultiplier {
                multiplier: Ok(Some(m.multiplier)),
                condition: Ok(m
                    .condition
                    .clone()
                    .map(|c| Box::new(c) as Box<dyn LiveCondition>)),
            })
            .collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiveSpeciesEntry {
    pub id: String,
    pub ordinal: Option<u32>,
    pub abilities: Vec<AbilitySlot>,
    pub learnset: Vec<LearnsetEntry>,
    pub drops: Vec<DropEntry>,
    pub egg_groups: Vec<String>,
    pub ev_yield: Option<EvYield>,
    pub pre_evolution: Option<String>,
    pub evolutions: Vec<String>,
}

impl LiveSpeciesEntry {
    pub fn new(id: impl Into<String>, ordinal: u32) -> Self {
        Self {
            id: id.into(),
            ordinal: Some(ordinal),
            ..Self::default()
        }
    }
}

impl LiveSpecies for LiveSpeciesEntry {
    fn id(&self) -> FieldResult<String> {
        if self.id.trim().is_empty() {
            return Err(FieldError::Missing("id"));
        }
        Ok(self.id.clone())
    }

    fn ordinal(&self) -> FieldResult<Option<u32>> {
        Ok(self.ordinal)
    }

    fn abilities(&self) -> FieldResult<Vec<AbilitySlot>> {
        Ok(self.abilities.clone())
    }

    fn learnset(&self) -> FieldResult<Vec<LearnsetEntry>> {
        Ok(self.learnset.clone())
    }

    fn drops(&self) -> FieldResult<Vec<DropEntry>> {
        Ok(self.drops.clone())
    }

    fn egg_groups(&self) -> FieldResult<Vec<String>> {
        Ok(self.egg_groups.clone())
    }

    fn ev_yield(&self) -> FieldResult<Option<EvYield>> {
        Ok(self.ev_yield)
    }

    fn pre_evolution(&self) -> FieldResult<Option<String>> {
        Ok(self.pre_evolution.clone())
    }

    fn evolution_targets(&self) -> FieldResult<Vec<String>> {
        Ok(self.evolutions.clone())
    }
}

/// Live source holding records in memory.
#[derive(Clone, Default)]
pub struct MemoryLiveSource {
    spawns: Vec<Arc<dyn LiveSpawnRecord>>,
    species: Vec<Arc<dyn LiveSpecies>>,
}

impl MemoryLiveSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spawn(mut self, record: impl LiveSpawnRecord + 'static) -> Self {
        self.spawns.push(Arc::new(record));
        self
    }

    pub fn with_species(mut self, species: impl LiveSpecies + 'static) -> Self {
        self.species.push(Arc::new(species));
        self
    }
}

impl LiveSource for MemoryLiveSource {
    fn spawn_records(&self) -> FieldResult<Vec<Arc<dyn LiveSpawnRecord>>> {
        Ok(self.spawns.clone())
    }

    fn species(&self) -> FieldResult<Vec<Arc<dyn LiveSpecies>>> {
        Ok(self.species.clone())
    }
}

/// Tag registry backed by a map; unknown tags have no members.
#[derive(Clone, Debug, Default)]
pub struct MemoryTagRegistry {
    tags: HashMap<String, Vec<String>>,
}

impl MemoryTagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag<I, S>(mut self, tag: &str, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.insert(
            tag.trim_start_matches('#').to_string(),
            members.into_iter().map(Into::into).collect(),
        );
        self
    }
}

impl TagRegistry for MemoryTagRegistry {
    fn members(&self, tag: &str) -> Option<Vec<String>> {
        Some(self.tags.get(tag).cloned().unwrap_or_default())
    }
}
