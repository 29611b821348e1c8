//! Species documents.
//!
//! One document per species, named after the species id:
//!
//! ```json
//! {
//!   "name": "Bulbasaur",
//!   "nationalPokedexNumber": 1,
//!   "abilities": ["overgrow", "h:chlorophyll"],
//!   "moves": ["1:tackle", "egg:petal_dance", "tm:toxic"],
//!   "eggGroups": ["monster", "grass"],
//!   "evYield": { "special_attack": 1 },
//!   "evolutions": [{
//!     "id": "bulbasaur_ivysaur",
//!     "variant": "level_up",
//!     "result": "ivysaur",
//!     "requirements": [{ "variant": "level", "minLevel": 16 }]
//!   }],
//!   "drops": { "amount": 1, "entries": [{ "item": "minecraft:wheat_seeds", "percentage": 20 }] }
//! }
//! ```
//!
//! Every field is optional. A field of the wrong type reads as absent and the
//! rest of the document still loads; a mistyped list element is dropped on
//! its own.

use std::collections::BTreeMap;

use dex_core::{
    AbilitySlot, DropEntry, EvYield, EvolutionEdge, LearnsetEntry, QuantityRange, Requirement,
    normalize_id, strip_namespace,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::{lenient, lenient_list};
use super::requirement::parse_requirement;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeciesDocument {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub national_pokedex_number: Option<u32>,
    #[serde(deserialize_with = "lenient")]
    pub implemented: Option<bool>,
    #[serde(deserialize_with = "lenient_list")]
    pub abilities: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub moves: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub egg_groups: Vec<String>,
    /// Raw values; [`SpeciesDocument::ev_yield`] keeps only those in range.
    #[serde(deserialize_with = "lenient")]
    pub ev_yield: BTreeMap<String, Value>,
    #[serde(deserialize_with = "lenient")]
    pub pre_evolution: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub evolutions: Vec<EvolutionDocument>,
    #[serde(deserialize_with = "lenient")]
    pub drops: Option<DropTableDocument>,
    #[serde(deserialize_with = "lenient_list")]
    pub forms: Vec<FormDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvolutionDocument {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub variant: Option<String>,
    pub result: String,
    /// Item used for `item_interact` evolutions, either a string or an
    /// object with an `item` field.
    pub required_context: Option<Value>,
    #[serde(deserialize_with = "lenient_list")]
    pub requirements: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropTableDocument {
    #[serde(deserialize_with = "lenient")]
    pub amount: Option<u32>,
    #[serde(deserialize_with = "lenient_list")]
    pub entries: Vec<DropEntryDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DropEntryDocument {
    pub item: String,
    #[serde(deserialize_with = "lenient")]
    pub percentage: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub quantity_range: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDocument {
    pub name: String,
    #[serde(deserialize_with = "lenient_list")]
    pub abilities: Vec<String>,
}

impl SpeciesDocument {
    pub fn abilities(&self) -> Vec<AbilitySlot> {
        self.abilities
            .iter()
            .filter_map(|raw| AbilitySlot::parse(raw))
            .collect()
    }

    pub fn learnset(&self) -> Vec<LearnsetEntry> {
        self.moves
            .iter()
            .filter_map(|raw| LearnsetEntry::parse(raw))
            .collect()
    }

    pub fn egg_groups(&self) -> Vec<String> {
        self.egg_groups
            .iter()
            .map(|group| normalize_id(group))
            .filter(|group| !group.is_empty())
            .collect()
    }

    pub fn ev_yield(&self) -> EvYield {
        let mut ev = EvYield::default();
        for (stat, value) in &self.ev_yield {
            match value.as_u64().and_then(|n| u8::try_from(n).ok()) {
                Some(points) => {
                    ev.set(stat, points);
                }
                None => tracing::trace!(stat = %stat, "Ignoring out-of-range EV value {}", value),
            }
        }
        ev
    }

    /// Drop entries; a missing percentage means a guaranteed drop.
    pub fn drops(&self) -> Vec<DropEntry> {
        let Some(table) = &self.drops else {
            return Vec::new();
        };
        table
            .entries
            .iter()
            .filter(|entry| !entry.item.trim().is_empty())
            .map(|entry| DropEntry {
                item_id: normalize_id(&entry.item),
                percentage: entry.percentage.unwrap_or(100.0),
                quantity: entry
                    .quantity_range
                    .as_deref()
                    .and_then(QuantityRange::parse)
                    .or(entry.quantity.map(|n| QuantityRange::new(n, n)))
                    .unwrap_or_default(),
            })
            .collect()
    }

    pub fn pre_evolution(&self) -> Option<String> {
        self.pre_evolution
            .as_deref()
            .map(species_part)
            .filter(|id| !id.is_empty())
    }

    /// Evolution edges with their requirements, variant first.
    pub fn evolution_edges(&self) -> Vec<EvolutionEdge> {
        self.evolutions
            .iter()
            .filter_map(EvolutionDocument::edge)
            .collect()
    }

    pub fn form_names(&self) -> Vec<String> {
        self.forms
            .iter()
            .map(|form| normalize_id(&form.name))
            .filter(|name| !name.is_empty())
            .collect()
    }
}

impl EvolutionDocument {
    fn edge(&self) -> Option<EvolutionEdge> {
        let target = species_part(&self.result);
        if target.is_empty() {
            return None;
        }

        let mut requirements = Vec::new();
        if let Some(variant) = self.variant_requirement() {
            requirements.push(variant);
        }
        requirements.extend(self.requirements.iter().map(parse_requirement));
        Some(EvolutionEdge::new(target, requirements))
    }

    fn variant_requirement(&self) -> Option<Requirement> {
        let variant = normalize_id(self.variant.as_deref().unwrap_or("level_up"));
        match variant.as_str() {
            "" | "level_up" => None,
            "trade" => Some(Requirement::Trade),
            "item_interact" => Some(Requirement::UseItem(
                self.context_item().unwrap_or_else(|| "?".to_string()),
            )),
            other => Some(Requirement::Unknown(other.to_string())),
        }
    }

    fn context_item(&self) -> Option<String> {
        match self.required_context.as_ref()? {
            Value::String(item) => Some(item.clone()),
            Value::Object(obj) => obj.get("item").and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }
}

/// The species id part of a property string (`"ivysaur form=x"` -> `ivysaur`),
/// without namespace.
fn species_part(raw: &str) -> String {
    raw.split_whitespace()
        .next()
        .map(|token| normalize_id(strip_namespace(token)))
        .unwrap_or_default()
}
