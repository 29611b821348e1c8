//! Evolution requirement objects (`{"variant": "...", ...}`).

use dex_core::{Requirement, normalize_id};
use serde_json::Value;

/// Converts one requirement object into a [`Requirement`].
///
/// Unrecognized variants, and recognized variants missing their payload,
/// become [`Requirement::Unknown`] carrying the raw variant name.
pub fn parse_requirement(value: &Value) -> Requirement {
    let variant = value
        .get("variant")
        .and_then(Value::as_str)
        .map(normalize_id)
        .unwrap_or_else(|| "?".to_string());

    known_requirement(&variant, value).unwrap_or(Requirement::Unknown(variant))
}

fn known_requirement(variant: &str, value: &Value) -> Option<Requirement> {
    let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
    let number = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    };
    let flag = |key: &str| value.get(key).and_then(Value::as_bool).unwrap_or(false);

    let requirement = match variant {
        "level" => Requirement::Level {
            min: number("minLevel")?,
        },
        "held_item" => Requirement::HeldItem(item_of(value.get("itemCondition")?)?),
        "friendship" => Requirement::Friendship(number("amount")?),
        "time_range" => Requirement::TimeOfDay(normalize_id(&text("range")?)),
        "biome" => Requirement::Biome(text("biomeCondition").or_else(|| text("biome"))?),
        "weather" => Requirement::Weather {
            rain: flag("isRaining"),
            thunder: flag("isThundering"),
        },
        "has_move" => Requirement::MoveKnown(normalize_id(&text("move")?)),
        "has_move_type" => Requirement::MoveType(normalize_id(&text("type")?)),
        "party_member" => Requirement::PartyMember(normalize_id(&text("target")?)),
        "properties" => {
            let target = text("target")?;
            let (key, gender) = target.split_once('=')?;
            if !key.trim().eq_ignore_ascii_case("gender") {
                return None;
            }
            Requirement::Gender(normalize_id(gender))
        }
        "stat_compare" => Requirement::StatCompare {
            high: normalize_id(&text("highStat")?),
            low: normalize_id(&text("lowStat")?),
        },
        "structure" => Requirement::Structure(text("structureCondition").or_else(|| text("structure"))?),
        "moon_phase" => Requirement::MoonPhase(u8::try_from(number("moonPhase")?).ok()?),
        "defeat" => Requirement::DefeatCount(number("amount")?),
        "trade" => Requirement::Trade,
        _ => return None,
    };
    Some(requirement)
}

/// An item condition is either `"ns:item"` or `{"item": "ns:item"}`.
fn item_of(value: &Value) -> Option<String> {
    match value {
        Value::String(item) => Some(item.clone()),
        Value::Object(obj) => obj.get("item").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
