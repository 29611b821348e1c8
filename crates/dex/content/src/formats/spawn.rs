//! Spawn pool documents.
//!
//! ```json
//! {
//!   "enabled": true,
//!   "spawns": [{
//!     "id": "bulbasaur-1",
//!     "pokemon": "bulbasaur",
//!     "presets": ["natural"],
//!     "context": "grounded",
//!     "bucket": "ultra-rare",
//!     "level": "5-32",
//!     "weight": 9.0,
//!     "condition": { "biomes": ["#cobblemon:is_jungle"], "timeRange": "day" },
//!     "anticondition": { "biomes": ["minecraft:bamboo_jungle"] },
//!     "weightMultiplier": { "multiplier": 5.0, "condition": { "isRaining": true } }
//!   }]
//! }
//! ```
//!
//! Rules and conditions stay raw JSON objects; the accessors below read one
//! field at a time and report type mismatches per field.

use dex_core::{FieldError, FieldResult, LevelRange, normalize_id};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::fields::{
    Object, mismatch, object_list, opt_bool, opt_f32, opt_i32, opt_str, opt_u8, opt_u32,
    string_list,
};

/// One spawn pool file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnPoolDocument {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub spawns: Vec<SpawnRuleDocument>,
}

fn enabled_by_default() -> bool {
    true
}

/// One spawn rule, kept as a raw JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpawnRuleDocument(pub Object);

impl SpawnRuleDocument {
    /// The raw `pokemon` field. Required: a rule without it is skipped.
    pub fn pokemon(&self) -> FieldResult<String> {
        opt_str(&self.0, "pokemon")?
            .filter(|p| !p.trim().is_empty())
            .ok_or(FieldError::Missing("pokemon"))
    }

    /// Splits `"vulpix form=alolan"` / `"vulpix alolan"` into species and form.
    pub fn species_and_form(&self) -> FieldResult<(String, Option<String>)> {
        let raw = self.pokemon()?;
        let mut tokens = raw.split_whitespace();
        let species = tokens.next().map(normalize_id).unwrap_or_default();
        let form = tokens.find_map(|token| match token.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("form") => Some(normalize_id(value)),
            Some(_) => None,
            None => Some(normalize_id(token)),
        });
        Ok((species, form))
    }

    pub fn id(&self) -> FieldResult<Option<String>> {
        opt_str(&self.0, "id")
    }

    pub fn presets(&self) -> FieldResult<Vec<String>> {
        string_list(&self.0, "presets")
    }

    pub fn context(&self) -> FieldResult<Option<String>> {
        opt_str(&self.0, "context")
    }

    pub fn bucket(&self) -> FieldResult<Option<String>> {
        opt_str(&self.0, "bucket")
    }

    /// `"5-32"`, `"7"` or a bare number.
    pub fn level(&self) -> FieldResult<Option<LevelRange>> {
        match self.0.get("level") {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => LevelRange::parse(s)
                .map(Some)
                .ok_or_else(|| mismatch("level", "level range", &Value::String(s.clone()))),
            Some(Value::Number(_)) => {
                Ok(opt_u32(&self.0, "level")?.map(|level| LevelRange::new(level, level)))
            }
            Some(other) => Err(mismatch("level", "level range", other)),
        }
    }

    pub fn weight(&self) -> FieldResult<Option<f32>> {
        opt_f32(&self.0, "weight")
    }

    pub fn conditions(&self) -> FieldResult<Vec<ConditionDocument>> {
        Ok(object_list(&self.0, "condition")?
            .into_iter()
            .map(ConditionDocument)
            .collect())
    }

    pub fn anticonditions(&self) -> FieldResult<Vec<ConditionDocument>> {
        Ok(object_list(&self.0, "anticondition")?
            .into_iter()
            .map(ConditionDocument)
            .collect())
    }

    /// The single `weightMultiplier` object.
    pub fn weight_multiplier(&self) -> FieldResult<Vec<MultiplierDocument>> {
        Ok(object_list(&self.0, "weightMultiplier")?
            .into_iter()
            .map(MultiplierDocument)
            .collect())
    }

    /// The `weightMultipliers` list.
    pub fn weight_multipliers(&self) -> FieldResult<Vec<MultiplierDocument>> {
        Ok(object_list(&self.0, "weightMultipliers")?
            .into_iter()
            .map(MultiplierDocument)
            .collect())
    }
}

/// A weight multiplier: a factor plus the condition under which it applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiplierDocument(pub Object);

impl MultiplierDocument {
    pub fn multiplier(&self) -> FieldResult<Option<f32>> {
        opt_f32(&self.0, "multiplier")
    }

    pub fn condition(&self) -> FieldResult<Option<ConditionDocument>> {
        Ok(object_list(&self.0, "condition")?
            .into_iter()
            .next()
            .map(ConditionDocument))
    }
}

/// A spawn condition object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionDocument(pub Object);

impl ConditionDocument {
    /// Raw biome references (`#ns:tag` or `ns:id`).
    pub fn biomes(&self) -> FieldResult<Vec<String>> {
        string_list(&self.0, "biomes")
    }

    pub fn time_range(&self) -> FieldResult<Option<String>> {
        opt_str(&self.0, "timeRange")
    }

    pub fn is_raining(&self) -> FieldResult<Option<bool>> {
        opt_bool(&self.0, "isRaining")
    }

    pub fn is_thundering(&self) -> FieldResult<Option<bool>> {
        opt_bool(&self.0, "isThundering")
    }

    pub fn can_see_sky(&self) -> FieldResult<Option<bool>> {
        opt_bool(&self.0, "canSeeSky")
    }

    pub fn min_y(&self) -> FieldResult<Option<i32>> {
        opt_i32(&self.0, "minY")
    }

    pub fn max_y(&self) -> FieldResult<Option<i32>> {
        opt_i32(&self.0, "maxY")
    }

    pub fn min_light(&self) -> FieldResult<Option<i32>> {
        opt_i32(&self.0, "minLight")
    }

    pub fn max_light(&self) -> FieldResult<Option<i32>> {
        opt_i32(&self.0, "maxLight")
    }

    pub fn min_sky_light(&self) -> FieldResult<Option<i32>> {
        opt_i32(&self.0, "minSkyLight")
    }

    pub fn max_sky_light(&self) -> FieldResult<Option<i32>> {
        opt_i32(&self.0, "maxSkyLight")
    }

    pub fn moon_phase(&self) -> FieldResult<Option<u8>> {
        opt_u8(&self.0, "moonPhase")
    }

    pub fn structures(&self) -> FieldResult<Vec<String>> {
        string_list(&self.0, "structures")
    }

    pub fn needed_nearby_blocks(&self) -> FieldResult<Vec<String>> {
        string_list(&self.0, "neededNearbyBlocks")
    }

    pub fn needed_base_blocks(&self) -> FieldResult<Vec<String>> {
        string_list(&self.0, "neededBaseBlocks")
    }

    pub fn min_lure_level(&self) -> FieldResult<Option<u32>> {
        opt_u32(&self.0, "minLureLevel")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(value: Value) -> SpawnRuleDocument {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn pool_defaults_to_enabled() {
        let pool: SpawnPoolDocument = serde_json::from_str(r#"{ "spawns": [] }"#).unwrap();
        assert!(pool.enabled);
    }

    #[test]
    fn species_and_form_tokens() {
        let plain = rule(json!({ "pokemon": "Bulbasaur" }));
        assert_eq!(plain.species_and_form(), Ok(("bulbasaur".into(), None)));

        let keyed = rule(json!({ "pokemon": "vulpix form=Alolan" }));
        assert_eq!(keyed.species_and_form(), Ok(("vulpix".into(), Some("alolan".into()))));

        let aspect = rule(json!({ "pokemon": "vulpix shiny=true alolan" }));
        assert_eq!(aspect.species_and_form(), Ok(("vulpix".into(), Some("alolan".into()))));

        let missing = rule(json!({ "level": "5" }));
        assert_eq!(missing.pokemon(), Err(FieldError::Missing("pokemon")));
    }

    #[test]
    fn level_encodings() {
        assert_eq!(
            rule(json!({ "level": "5-32" })).level(),
            Ok(Some(LevelRange::new(5, 32)))
        );
        assert_eq!(
            rule(json!({ "level": 12 })).level(),
            Ok(Some(LevelRange::new(12, 12)))
        );
        assert!(rule(json!({ "level": "five" })).level().is_err());
    }

    #[test]
    fn multipliers_and_conditions() {
        let doc = rule(json!({
            "condition": { "biomes": ["#c:is_forest"], "moonPhase": 3 },
            "weightMultiplier": { "multiplier": 2.0, "condition": { "isRaining": true } },
            "weightMultipliers": [{ "multiplier": 4 }]
        }));
        let conditions = doc.conditions().unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].moon_phase(), Ok(Some(3)));
        assert_eq!(doc.weight_multiplier().unwrap().len(), 1);
        let list = doc.weight_multipliers().unwrap();
        assert_eq!(list[0].multiplier(), Ok(Some(4.0)));
        assert_eq!(list[0].condition(), Ok(None));
    }
}
