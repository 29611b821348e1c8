//! Plain-text rendering of query results.

use std::fmt::Write;

use dex_core::{
    AbilityBearer, Bounds, EvYield, EvoNode, ItemDropper, LearnsetEntry, MoveLearner,
    SpawnCondition, Weather,
};
use dex_resolver::SourceStatus;

pub fn spawn_conditions(entity: &str, conditions: &[SpawnCondition]) -> String {
    if conditions.is_empty() {
        return format!("No spawn data for {entity}\n");
    }

    let mut out = String::new();
    for (i, condition) in conditions.iter().enumerate() {
        let _ = write!(out, "#{} {}", i + 1, condition.rarity_bucket);
        match condition.level_range {
            Some(range) => {
                let _ = writeln!(out, " (Lv. {range})");
            }
            None => out.push('\n'),
        }

        let biomes = if condition.is_biome_unconstrained() {
            "anywhere".to_string()
        } else {
            labels(condition.biome_clauses.iter().map(|c| c.display_label.as_str()))
        };
        let _ = writeln!(out, "  biomes:   {biomes}");
        if !condition.excluded_biome_clauses.is_empty() {
            let excluded = labels(
                condition
                    .excluded_biome_clauses
                    .iter()
                    .map(|c| c.display_label.as_str()),
            );
            let _ = writeln!(out, "  excluded: {excluded}");
        }
        if !condition.time_of_day.is_any() {
            let _ = writeln!(out, "  time:     {}", condition.time_of_day);
        }
        if condition.weather != Weather::Any {
            let _ = writeln!(out, "  weather:  {}", condition.weather);
        }
        if let Some(weight) = condition.weight {
            let _ = writeln!(out, "  weight:   {weight}");
        }
        for (name, bounds) in [
            ("y", condition.y_range),
            ("light", condition.light_range),
            ("sky", condition.sky_light_range),
        ] {
            if let Some(bounds) = bounds {
                let _ = writeln!(out, "  {name:<9} {}", bounds_label(bounds));
            }
        }
        if let Some(moon) = condition.moon_phase {
            let _ = writeln!(out, "  moon:     {moon}");
        }
        if !condition.required_structures.is_empty() {
            let _ = writeln!(out, "  structures: {}", condition.required_structures.join(", "));
        }
        for multiplier in &condition.weight_multipliers {
            let _ = writeln!(
                out,
                "  x{} when {}",
                multiplier.multiplier, multiplier.condition_summary
            );
        }
    }
    out
}

fn labels<'a>(labels: impl Iterator<Item = &'a str>) -> String {
    labels.collect::<Vec<_>>().join(", ")
}

fn bounds_label(bounds: Bounds) -> String {
    match (bounds.min, bounds.max) {
        (Some(min), Some(max)) => format!("{min}..{max}"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => "any".to_string(),
    }
}

pub fn learners(move_id: &str, learners: &[MoveLearner]) -> String {
    if learners.is_empty() {
        return format!("No species learn {move_id}\n");
    }
    let mut out = String::new();
    for learner in learners {
        let level = learner.level.map(|l| format!(" {l}")).unwrap_or_default();
        let _ = writeln!(out, "{:>5}  {} ({}{})", ordinal(learner.ordinal), learner.entity_id, learner.method, level);
    }
    out
}

pub fn bearers(ability: &str, bearers: &[AbilityBearer]) -> String {
    if bearers.is_empty() {
        return format!("No species have {ability}\n");
    }
    let mut out = String::new();
    for bearer in bearers {
        let hidden = if bearer.is_hidden { " (hidden)" } else { "" };
        let _ = writeln!(out, "{:>5}  {}{}", ordinal(bearer.ordinal), bearer.entity_id, hidden);
    }
    out
}

pub fn droppers(item: &str, droppers: &[ItemDropper]) -> String {
    if droppers.is_empty() {
        return format!("No species drop {item}\n");
    }
    let mut out = String::new();
    for dropper in droppers {
        let _ = writeln!(
            out,
            "{:>5}  {} {}% x{}",
            ordinal(dropper.ordinal),
            dropper.entity_id,
            dropper.percentage,
            dropper.quantity
        );
    }
    out
}

fn ordinal(ordinal: u32) -> String {
    if ordinal == dex_resolver::UNKNOWN_ORDINAL {
        "?".to_string()
    } else {
        format!("#{ordinal}")
    }
}

pub fn evolution_tree(tree: &EvoNode) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, 0);
    out
}

fn write_node(out: &mut String, node: &EvoNode, depth: usize) {
    let marker = if node.is_target_entity { " *" } else { "" };
    let transition = if node.transition_condition.is_empty() {
        String::new()
    } else {
        format!(" [{}]", node.transition_condition)
    };
    let _ = writeln!(out, "{}{}{}{}", "  ".repeat(depth), node.entity_id, transition, marker);
    for child in &node.children {
        write_node(out, child, depth + 1);
    }
}

pub fn moves(entity: &str, moves: &[LearnsetEntry]) -> String {
    if moves.is_empty() {
        return format!("No moves known for {entity}\n");
    }
    let mut out = String::new();
    for entry in moves {
        match entry.level {
            Some(level) => {
                let _ = writeln!(out, "{} ({} {})", entry.move_id, entry.method, level);
            }
            None => {
                let _ = writeln!(out, "{} ({})", entry.move_id, entry.method);
            }
        }
    }
    out
}

pub fn ev_yield(entity: &str, ev: Option<EvYield>) -> String {
    let Some(ev) = ev else {
        return format!("No EV yield known for {entity}\n");
    };
    format!(
        "hp {} / atk {} / def {} / spa {} / spd {} / spe {}\n",
        ev.hp, ev.attack, ev.defence, ev.special_attack, ev.special_defence, ev.speed
    )
}

pub fn status(statuses: &[SourceStatus]) -> String {
    let mut out = String::new();
    for status in statuses {
        let source = status
            .source
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = write!(
            out,
            "{:<15} {:<9} {:<7} {:>6}",
            status.kind.to_string(),
            status.state.to_string(),
            source,
            status.entries
        );
        if let Some(error) = &status.error {
            let _ = write!(out, "  ({error})");
        }
        out.push('\n');
    }
    out
}
