//! Loaders and extractors shared by the resolvers and indices.
//!
//! Live species and static species documents both implement
//! [`LiveSpecies`], so every function here serves either source.

use std::collections::HashMap;
use std::sync::Arc;

use dex_content::StaticLibrary;
use dex_core::{
    AbilityBearer, FieldResult, ItemDropper, MoveLearner, SpawnCondition, SpawnKey,
    SpeciesCatalog, normalize_id,
};

use crate::error::{DexError, Result};
use crate::live::{LiveSource, LiveSpecies};
use crate::normalize::{NormalizedRule, normalize_live, normalize_static};

/// Ordinal given to species neither the catalog nor the record can place.
pub const UNKNOWN_ORDINAL: u32 = u32::MAX;

pub type SpeciesHandle = Arc<dyn LiveSpecies>;

pub(crate) fn live_species(live: &dyn LiveSource) -> Result<Vec<SpeciesHandle>> {
    live.species()
        .map_err(|e| DexError::LiveUnavailable(e.to_string()))
}

/// Groups normalized rules by species and form, in scan order.
fn group_rules(rules: impl Iterator<Item = NormalizedRule>) -> HashMap<SpawnKey, Vec<SpawnCondition>> {
    let mut map: HashMap<SpawnKey, Vec<SpawnCondition>> = HashMap::new();
    for rule in rules {
        let key = SpawnKey::new(&rule.species, rule.form.as_deref());
        map.entry(key).or_default().push(rule.condition);
    }
    map
}

pub(crate) fn live_spawns(live: &dyn LiveSource) -> Result<HashMap<SpawnKey, Vec<SpawnCondition>>> {
    let records = live
        .spawn_records()
        .map_err(|e| DexError::LiveUnavailable(e.to_string()))?;
    Ok(group_rules(
        records.iter().filter_map(|record| normalize_live(record.as_ref())),
    ))
}

pub(crate) fn static_spawns(library: &StaticLibrary) -> HashMap<SpawnKey, Vec<SpawnCondition>> {
    let mut skipped = 0usize;
    let map = group_rules(library.spawn_rules().filter_map(|(pool, rule)| {
        let normalized = normalize_static(rule);
        if normalized.is_none() {
            skipped += 1;
            tracing::debug!("Skipping rule without species in spawn pool {}", pool);
        }
        normalized
    }));
    if skipped > 0 {
        tracing::warn!(skipped, "Static spawn rules without a species were skipped");
    }
    map
}

/// Builds `species id -> value` from per-species reads.
///
/// A read that fails, or yields `None`, leaves the species out.
pub(crate) fn forward_map<T>(
    species: &[SpeciesHandle],
    read: impl Fn(&dyn LiveSpecies) -> FieldResult<Option<T>>,
) -> HashMap<String, T> {
    let mut map = HashMap::new();
    for handle in species {
        let id = match handle.id() {
            Ok(id) => normalize_id(&id),
            Err(e) => {
                tracing::trace!("Skipping species without id: {}", e);
                continue;
            }
        };
        match read(handle.as_ref()) {
            Ok(Some(value)) => {
                map.entry(id).or_insert(value);
            }
            Ok(None) => {}
            Err(e) => tracing::trace!(field = e.field(), "Skipping {}: {}", id, e),
        }
    }
    map
}

/// Some(list) when the list is non-empty.
pub(crate) fn non_empty<T>(list: Vec<T>) -> Option<Vec<T>> {
    (!list.is_empty()).then_some(list)
}

/// Resolves the presentation ordinal of a species.
pub(crate) fn ordinal_of(catalog: &dyn SpeciesCatalog, species: &dyn LiveSpecies, id: &str) -> u32 {
    catalog
        .ordinal(id)
        .or_else(|| species.ordinal().ok().flatten())
        .unwrap_or(UNKNOWN_ORDINAL)
}

fn species_id(species: &dyn LiveSpecies) -> FieldResult<String> {
    Ok(normalize_id(&species.id()?))
}

pub(crate) fn ability_pairs(
    catalog: &dyn SpeciesCatalog,
    species: &SpeciesHandle,
) -> FieldResult<Vec<(String, AbilityBearer)>> {
    let id = species_id(species.as_ref())?;
    let ordinal = ordinal_of(catalog, species.as_ref(), &id);
    Ok(species
        .abilities()?
        .into_iter()
        .map(|slot| {
            (
                slot.ability_id,
                AbilityBearer {
                    entity_id: id.clone(),
                    ordinal,
                    is_hidden: slot.is_hidden,
                },
            )
        })
        .collect())
}

pub(crate) fn move_pairs(
    catalog: &dyn SpeciesCatalog,
    species: &SpeciesHandle,
) -> FieldResult<Vec<(String, MoveLearner)>> {
    let id = species_id(species.as_ref())?;
    let ordinal = ordinal_of(catalog, species.as_ref(), &id);
    Ok(species
        .learnset()?
        .into_iter()
        .map(|entry| {
            (
                entry.move_id,
                MoveLearner {
                    entity_id: id.clone(),
                    ordinal,
                    method: entry.method,
                    level: entry.level,
                },
            )
        })
        .collect())
}

pub(crate) fn drop_pairs(
    catalog: &dyn SpeciesCatalog,
    species: &SpeciesHandle,
) -> FieldResult<Vec<(String, ItemDropper)>> {
    let id = species_id(species.as_ref())?;
    let ordinal = ordinal_of(catalog, species.as_ref(), &id);
    Ok(species
        .drops()?
        .into_iter()
        .map(|drop| {
            (
                drop.item_id,
                ItemDropper {
                    entity_id: id.clone(),
                    ordinal,
                    percentage: drop.percentage,
                    quantity: drop.quantity,
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{LiveSpawnEntry, LiveSpeciesEntry, MemoryLiveSource};
    use dex_content::{DocumentKind, MemorySource};
    use dex_core::{AbilitySlot, StaticCatalog};

    #[test]
    fn catalog_ordinal_wins_over_record_number() {
        let catalog: StaticCatalog = [("pikachu", 25)].into_iter().collect();
        let known = LiveSpeciesEntry::new("pikachu", 999);
        let unknown = LiveSpeciesEntry {
            ordinal: None,
            ..LiveSpeciesEntry::new("missingno", 0)
        };
        assert_eq!(ordinal_of(&catalog, &known, "pikachu"), 25);
        assert_eq!(ordinal_of(&catalog, &LiveSpeciesEntry::new("mew", 151), "mew"), 151);
        assert_eq!(ordinal_of(&catalog, &unknown, "missingno"), UNKNOWN_ORDINAL);
    }

    #[test]
    fn forward_map_skips_empty_values() {
        let species: Vec<SpeciesHandle> = vec![
            Arc::new(LiveSpeciesEntry {
                egg_groups: vec!["field".into()],
                ..LiveSpeciesEntry::new("pikachu", 25)
            }),
            Arc::new(LiveSpeciesEntry::new("ditto", 132)),
        ];
        let map = forward_map(&species, |s| Ok(non_empty(s.egg_groups()?)));
        assert_eq!(map.len(), 1);
        assert_eq!(map["pikachu"], vec!["field"]);
    }

    #[test]
    fn ability_pairs_carry_hidden_flag() {
        let catalog = StaticCatalog::new();
        let species: SpeciesHandle = Arc::new(LiveSpeciesEntry {
            abilities: vec![
                AbilitySlot::parse("static").unwrap(),
                AbilitySlot::parse("h:lightning_rod").unwrap(),
            ],
            ..LiveSpeciesEntry::new("Pikachu", 25)
        });
        let pairs = ability_pairs(&catalog, &species).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].0, "lightning_rod");
        assert!(pairs[1].1.is_hidden);
        assert_eq!(pairs[0].1.entity_id, "pikachu");
    }

    #[test]
    fn live_spawns_group_by_form() {
        let live = MemoryLiveSource::new()
            .with_spawn(LiveSpawnEntry::new("vulpix"))
            .with_spawn(LiveSpawnEntry {
                form: Some("alolan".into()),
                ..LiveSpawnEntry::new("vulpix")
            })
            .with_spawn(LiveSpawnEntry::new(""));
        let map = live_spawns(&live).unwrap();
        assert_eq!(map.len(), 2);
        assert!(map.contains_key(&SpawnKey::new("vulpix", Some("alolan"))));
    }

    #[test]
    fn static_spawns_read_every_pool() {
        let source = MemorySource::new()
            .with(
                DocumentKind::SpawnPool,
                "a.json",
                r#"{ "spawns": [{ "pokemon": "bulbasaur" }, { "level": "3" }] }"#,
            )
            .with(
                DocumentKind::SpawnPool,
                "b.json",
                r#"{ "spawns": [{ "pokemon": "bulbasaur", "bucket": "rare" }] }"#,
            );
        let library = StaticLibrary::load(&source).unwrap();
        let map = static_spawns(&library);
        assert_eq!(map[&SpawnKey::base("bulbasaur")].len(), 2);
    }
}
