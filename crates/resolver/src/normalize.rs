//! Condition normalization.
//!
//! Turns one spawn rule record, live or static, into a [`SpawnCondition`].
//! Only the species id is required. Every other attribute is read on its own;
//! a failing read leaves that attribute unconstrained and is logged at
//! `trace` level.

use dex_content::SpawnRuleDocument;
use dex_core::{
    Bounds, DEFAULT_BUCKET, FieldResult, MultiplierConditions, SpawnCondition, TimeOfDay, Weather,
    normalize_id,
};

use crate::live::{LiveCondition, LiveMultiplier, LiveSpawnRecord};

/// A normalized rule together with the species and form it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedRule {
    pub species: String,
    pub form: Option<String>,
    pub condition: SpawnCondition,
}

/// Normalizes a live record. Returns `None` when the species id is missing.
pub fn normalize_live(record: &dyn LiveSpawnRecord) -> Option<NormalizedRule> {
    let species = match record.species() {
        Ok(species) => normalize_id(&species),
        Err(e) => {
            tracing::debug!("Skipping spawn record without species: {}", e);
            return None;
        }
    };
    if species.is_empty() {
        tracing::debug!("Skipping spawn record with empty species id");
        return None;
    }

    let form = read(record.form())
        .flatten()
        .map(|form| normalize_id(&form))
        .filter(|form| !form.is_empty());

    let mut condition = SpawnCondition {
        source_id: read(record.id()).flatten(),
        presets: read(record.presets()).unwrap_or_default(),
        context: read(record.context())
            .flatten()
            .map(|context| normalize_id(&context)),
        rarity_bucket: read(record.bucket())
            .flatten()
            .map(|bucket| normalize_id(&bucket))
            .filter(|bucket| !bucket.is_empty())
            .unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
        level_range: read(record.level()).flatten(),
        weight: read(record.weight()).flatten(),
        ..SpawnCondition::default()
    };

    for alternative in read(record.conditions()).unwrap_or_default() {
        merge_condition(&mut condition, alternative.as_ref());
    }
    for anticondition in read(record.anticonditions()).unwrap_or_default() {
        for biome in read(anticondition.biomes()).unwrap_or_default() {
            if let Some(clause) = biome.into_clause() {
                condition.push_excluded_biome(clause);
            }
        }
    }
    for multiplier in read(record.weight_multipliers()).unwrap_or_default() {
        if let Some(multiplier) = weight_multiplier(multiplier) {
            condition.weight_multipliers.push(multiplier);
        }
    }

    condition.finalize();
    Some(NormalizedRule {
        species,
        form,
        condition,
    })
}

/// Normalizes a static spawn rule.
pub fn normalize_static(rule: &SpawnRuleDocument) -> Option<NormalizedRule> {
    normalize_live(rule)
}

/// Biomes are unioned across alternatives; every other attribute is taken
/// from the first alternative that provides it.
fn merge_condition(target: &mut SpawnCondition, source: &dyn LiveCondition) {
    for biome in read(source.biomes()).unwrap_or_default() {
        if let Some(clause) = biome.into_clause() {
            target.push_biome(clause);
        }
    }

    if target.time_of_day.is_any()
        && let Some(range) = read(source.time_range()).flatten()
    {
        target.time_of_day = TimeOfDay::from_range_name(&range);
    }
    if target.weather == Weather::Any {
        target.weather = Weather::from_flags(
            read(source.is_raining()).flatten(),
            read(source.is_thundering()).flatten(),
        );
    }
    if target.can_see_sky.is_none() {
        target.can_see_sky = read(source.can_see_sky()).flatten();
    }
    if target.y_range.is_none() {
        target.y_range = read(source.y_bounds()).and_then(|(lo, hi)| Bounds::new(lo, hi));
    }
    if target.light_range.is_none() {
        target.light_range = read(source.light_bounds()).and_then(|(lo, hi)| Bounds::new(lo, hi));
    }
    if target.sky_light_range.is_none() {
        target.sky_light_range =
            read(source.sky_light_bounds()).and_then(|(lo, hi)| Bounds::new(lo, hi));
    }
    if target.moon_phase.is_none() {
        target.moon_phase = read(source.moon_phase()).flatten();
    }
    if target.required_structures.is_empty() {
        target.required_structures = read(source.structures()).unwrap_or_default();
    }
    if target.required_nearby_blocks.is_empty() {
        target.required_nearby_blocks = read(source.nearby_blocks()).unwrap_or_default();
    }
    if target.required_base_blocks.is_empty() {
        target.required_base_blocks = read(source.base_blocks()).unwrap_or_default();
    }
}

fn weight_multiplier(record: LiveMultiplier) -> Option<dex_core::WeightMultiplier> {
    let factor = read(record.multiplier).flatten()?;
    let conditions = read(record.condition)
        .flatten()
        .map(|c| MultiplierConditions {
            is_raining: read(c.is_raining()).flatten(),
            is_thundering: read(c.is_thundering()).flatten(),
            time_range: read(c.time_range()).flatten(),
            min_lure_level: read(c.min_lure_level()).flatten(),
            moon_phase: read(c.moon_phase()).flatten(),
        })
        .unwrap_or_default();
    Some(conditions.into_multiplier(factor))
}

/// Recovers a field-level failure: the attribute becomes unconstrained.
fn read<T>(result: FieldResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::trace!(field = e.field(), "Field unavailable: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::{LiveBiomeRef, LiveConditionEntry, LiveMultiplierEntry, LiveSpawnEntry};
    use dex_core::{FieldError, LevelRange};
    use serde_json::json;

    fn rule(value: serde_json::Value) -> SpawnRuleDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn static_rule_with_tag_biome() {
        let normalized = normalize_static(&rule(json!({
            "pokemon": "Onix",
            "level": "20-40",
            "bucket": "uncommon",
            "condition": { "biomes": ["#mymod:is_mountain"], "timeRange": "night" }
        })))
        .unwrap();

        assert_eq!(normalized.species, "onix");
        let condition = normalized.condition;
        assert_eq!(condition.biome_clauses.len(), 1);
        assert_eq!(condition.biome_clauses[0].display_label, "Mountain");
        assert_eq!(
            condition.biome_clauses[0].tag_reference.as_deref(),
            Some("mymod:is_mountain")
        );
        assert_eq!(condition.time_of_day, TimeOfDay::Night);
        assert_eq!(condition.level_range, Some(LevelRange::new(20, 40)));
        assert_eq!(condition.rarity_bucket, "uncommon");
    }

    #[test]
    fn absent_level_differs_from_full_range() {
        let absent = normalize_static(&rule(json!({ "pokemon": "zubat" }))).unwrap();
        let explicit =
            normalize_static(&rule(json!({ "pokemon": "zubat", "level": "1-100" }))).unwrap();

        assert_eq!(absent.condition.level_range, None);
        assert_eq!(explicit.condition.level_range, Some(LevelRange::new(1, 100)));
        assert_ne!(absent.condition, explicit.condition);
    }

    #[test]
    fn missing_species_skips_the_record() {
        assert!(normalize_static(&rule(json!({ "level": "5" }))).is_none());
        assert!(normalize_live(&LiveSpawnEntry::default()).is_none());
    }

    #[test]
    fn mistyped_field_only_loses_that_attribute() {
        let normalized = normalize_static(&rule(json!({
            "pokemon": "zubat",
            "level": { "min": 5 },
            "condition": { "biomes": ["minecraft:dripstone_caves"], "canSeeSky": "no", "maxLight": 7 }
        })))
        .unwrap();
        let condition = normalized.condition;
        assert_eq!(condition.level_range, None);
        assert_eq!(condition.can_see_sky, None);
        assert_eq!(condition.biome_clauses[0].display_label, "Dripstone Caves");
        assert_eq!(
            condition.light_range,
            Some(Bounds {
                min: None,
                max: Some(7)
            })
        );
    }

    #[test]
    fn multiplier_summaries() {
        let normalized = normalize_static(&rule(json!({
            "pokemon": "clefairy",
            "weightMultiplier": { "multiplier": 3.0, "condition": { "moonPhase": 3 } },
            "weightMultipliers": [
                { "multiplier": 2.0 },
                { "multiplier": 5.0, "condition": { "isRaining": false, "timeRange": "night" } },
                { "condition": { "isRaining": true } }
            ]
        })))
        .unwrap();
        let labels: Vec<_> = normalized
            .condition
            .weight_multipliers
            .iter()
            .map(|m| (m.multiplier, m.condition_summary.as_str()))
            .collect();
        assert_eq!(
            labels,
            vec![(3.0, "moon:3"), (2.0, "?"), (5.0, "clear, time:night")]
        );
    }

    #[test]
    fn exclusions_remove_positive_clauses() {
        let normalized = normalize_static(&rule(json!({
            "pokemon": "bidoof",
            "condition": { "biomes": ["minecraft:plains", "#c:is_forest"] },
            "anticondition": { "biomes": ["minecraft:plains"] }
        })))
        .unwrap();
        let condition = normalized.condition;
        assert_eq!(condition.biome_clauses.len(), 1);
        assert!(condition.biome_clauses[0].is_tag());
        assert_eq!(condition.excluded_biome_clauses.len(), 1);
    }

    #[test]
    fn live_alternatives_union_biomes_first_wins_otherwise() {
        let record = LiveSpawnEntry {
            form: Some("Alolan".into()),
            conditions: vec![
                LiveConditionEntry {
                    biomes: vec![LiveBiomeRef::Id("minecraft:snowy_plains".into())],
                    time_range: Some("day".into()),
                    ..Default::default()
                },
                LiveConditionEntry {
                    biomes: vec![
                        LiveBiomeRef::Tag("c:is_icy".into()),
                        LiveBiomeRef::Unrecognized("???".into()),
                        LiveBiomeRef::Id("other:snowy_plains".into()),
                    ],
                    time_range: Some("night".into()),
                    is_thundering: Some(true),
                    ..Default::default()
                },
            ],
            multipliers: vec![LiveMultiplierEntry {
                multiplier: 1.5,
                condition: None,
            }],
            ..LiveSpawnEntry::new("vulpix")
        };

        let normalized = normalize_live(&record).unwrap();
        assert_eq!(normalized.form.as_deref(), Some("alolan"));
        let condition = normalized.condition;
        let labels: Vec<_> = condition
            .biome_clauses
            .iter()
            .map(|c| c.display_label.as_str())
            .collect();
        assert_eq!(labels, vec!["Snowy Plains", "Icy"]);
        assert_eq!(condition.time_of_day, TimeOfDay::Day);
        assert_eq!(condition.weather, Weather::Thunder);
        assert_eq!(condition.weight_multipliers[0].condition_summary, "?");
    }

    #[test]
    fn host_errors_degrade_per_field() {
        struct Flaky;
        impl LiveSpawnRecord for Flaky {
            fn species(&self) -> FieldResult<String> {
                Ok("Geodude".into())
            }
            fn level(&self) -> FieldResult<Option<LevelRange>> {
                Err(FieldError::Host {
                    field: "level",
                    message: "reflection failed".into(),
                })
            }
            fn weight(&self) -> FieldResult<Option<f32>> {
                Ok(Some(4.5))
            }
        }

        let normalized = normalize_live(&Flaky).unwrap();
        assert_eq!(normalized.species, "geodude");
        assert_eq!(normalized.condition.level_range, None);
        assert_eq!(normalized.condition.weight, Some(4.5));
        assert!(normalized.condition.is_biome_unconstrained());
    }

    #[test]
    fn normalization_is_idempotent() {
        let doc = rule(json!({
            "pokemon": "ponyta",
            "condition": { "biomes": ["#c:is_plains", "#c:is_plains"], "minY": 60 }
        }));
        assert_eq!(normalize_static(&doc), normalize_static(&doc));
        assert_eq!(normalize_static(&doc).unwrap().condition.biome_clauses.len(), 1);
    }
}
