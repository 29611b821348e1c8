//! Identifier and display-label helpers.
//!
//! Upstream sources name biomes and items with either namespaced registry
//! identifiers (`minecraft:dark_forest`) or tag paths (`#mymod:is_mountain`,
//! `c:is_hot/overworld`). Both are turned into "Capitalized Words" with the
//! same rule so the two sources render identically.

/// Classifier prefix stripped from every path segment of a label.
const CLASSIFIER_PREFIX: &str = "is_";

/// Returns the path part of a namespaced identifier (`ns:path` -> `path`).
pub fn strip_namespace(raw: &str) -> &str {
    raw.split_once(':').map_or(raw, |(_, path)| path)
}

/// Lower-cases and trims an identifier so lookups are case-insensitive.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Formats a biome, tag or item reference as a human-readable label.
///
/// Strips a leading `#` and the namespace, splits the path on `/` and `.`,
/// removes the `is_` classifier from each segment, then title-cases every
/// word separated by `_`, `-` or spaces.
///
/// ```
/// use dex_core::format_label;
///
/// assert_eq!(format_label("#mymod:is_mountain"), "Mountain");
/// assert_eq!(format_label("minecraft:dark_forest"), "Dark Forest");
/// ```
pub fn format_label(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('#');
    let path = strip_namespace(trimmed);

    let words: Vec<String> = path
        .split(['/', '.'])
        .map(|segment| segment.strip_prefix(CLASSIFIER_PREFIX).unwrap_or(segment))
        .flat_map(|segment| segment.split(['_', '-', ' ']))
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();

    if words.is_empty() {
        trimmed.to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_reference_drops_hash_namespace_and_classifier() {
        assert_eq!(format_label("#mymod:is_mountain"), "Mountain");
        assert_eq!(format_label("#cobblemon:is_tropical_island"), "Tropical Island");
    }

    #[test]
    fn hierarchical_paths_keep_every_segment() {
        assert_eq!(format_label("c:is_hot/overworld"), "Hot Overworld");
        assert_eq!(format_label("biome.minecraft.is_plains"), "Biome Minecraft Plains");
    }

    #[test]
    fn direct_ids_are_title_cased() {
        assert_eq!(format_label("minecraft:DARK_FOREST"), "Dark Forest");
        assert_eq!(format_label("snowy-taiga"), "Snowy Taiga");
    }

    #[test]
    fn degenerate_input_falls_back_to_raw() {
        assert_eq!(format_label("minecraft:"), "minecraft:");
        assert_eq!(format_label(""), "");
    }

    #[test]
    fn strip_namespace_only_touches_the_first_colon() {
        assert_eq!(strip_namespace("minecraft:fire_stone"), "fire_stone");
        assert_eq!(strip_namespace("fire_stone"), "fire_stone");
    }
}
