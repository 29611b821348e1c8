//! Canonical spawn-condition model.
//!
//! Both upstream sources describe spawn rules with different vocabularies;
//! they are normalized into [`SpawnCondition`]. Absence of a constraint is
//! always `None` or an `Any` variant so that "unconstrained" never collides
//! with "constrained to zero".

use std::collections::HashSet;
use std::fmt;

use crate::label::{format_label, normalize_id};

/// Rarity bucket used when a rule does not name one.
pub const DEFAULT_BUCKET: &str = "common";

/// Key of the spawn resolver: species plus optional form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnKey {
    pub species: String,
    pub form: Option<String>,
}

impl SpawnKey {
    /// Creates a key, normalizing both parts to lower case.
    pub fn new(species: &str, form: Option<&str>) -> Self {
        Self {
            species: normalize_id(species),
            form: form.map(normalize_id).filter(|f| !f.is_empty()),
        }
    }

    /// Key of the base form of a species.
    pub fn base(species: &str) -> Self {
        Self::new(species, None)
    }
}

/// A positive or negated biome requirement.
///
/// Exactly one of `tag_reference` / `direct_id` is set; the constructors are
/// the only way to build one.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BiomeClause {
    pub display_label: String,
    pub tag_reference: Option<String>,
    pub direct_id: Option<String>,
}

impl BiomeClause {
    /// Clause referencing a biome tag (group of biomes).
    pub fn tag(reference: &str) -> Self {
        let reference = reference.trim().trim_start_matches('#').to_string();
        Self {
            display_label: format_label(&reference),
            tag_reference: Some(reference),
            direct_id: None,
        }
    }

    /// Clause referencing one biome directly.
    pub fn direct(id: &str) -> Self {
        let id = id.trim().to_string();
        Self {
            display_label: format_label(&id),
            tag_reference: None,
            direct_id: Some(id),
        }
    }

    /// Parses the static encoding: `#ns:tag` is a tag, `ns:id` a direct id.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw == "#" {
            return None;
        }
        if raw.starts_with('#') {
            Some(Self::tag(raw))
        } else {
            Some(Self::direct(raw))
        }
    }

    /// The tag or direct id this clause points at.
    pub fn reference(&self) -> &str {
        self.tag_reference
            .as_deref()
            .or(self.direct_id.as_deref())
            .unwrap_or_default()
    }

    pub fn is_tag(&self) -> bool {
        self.tag_reference.is_some()
    }
}

/// Time-of-day constraint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeOfDay {
    #[default]
    Any,
    Day,
    Night,
    Morning,
    Noon,
    Dusk,
    Midnight,
    /// A named range the layer does not know; rendered verbatim.
    Custom(String),
}

impl TimeOfDay {
    /// Maps an upstream time-range name onto the enum.
    pub fn from_range_name(raw: &str) -> Self {
        match normalize_id(raw).as_str() {
            "" | "any" | "all" => Self::Any,
            "day" | "daytime" => Self::Day,
            "night" | "nighttime" => Self::Night,
            "morning" | "dawn" => Self::Morning,
            "noon" | "midday" => Self::Noon,
            "dusk" | "twilight" | "evening" => Self::Dusk,
            "midnight" => Self::Midnight,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "any",
            Self::Day => "day",
            Self::Night => "night",
            Self::Morning => "morning",
            Self::Noon => "noon",
            Self::Dusk => "dusk",
            Self::Midnight => "midnight",
            Self::Custom(name) => name,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weather constraint.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Weather {
    #[default]
    Any,
    Clear,
    Rain,
    Thunder,
}

impl Weather {
    /// Derives the weather constraint from the raining/thundering flags.
    ///
    /// Thunder implies rain; an explicit `raining = false` means clear skies.
    pub fn from_flags(is_raining: Option<bool>, is_thundering: Option<bool>) -> Self {
        match (is_raining, is_thundering) {
            (_, Some(true)) => Self::Thunder,
            (Some(true), _) => Self::Rain,
            (Some(false), _) => Self::Clear,
            _ => Self::Any,
        }
    }
}

/// Inclusive level range, always ordered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelRange {
    pub min: u32,
    pub max: u32,
}

impl LevelRange {
    /// Creates a range, swapping the bounds if they are reversed.
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Parses `"5-32"` or a single level `"7"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once('-') {
            Some((lo, hi)) => {
                let lo = lo.trim().parse().ok()?;
                let hi = hi.trim().parse().ok()?;
                Some(Self::new(lo, hi))
            }
            None => raw.parse().ok().map(|level| Self::new(level, level)),
        }
    }
}

impl fmt::Display for LevelRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// Optional min/max pair for y level and light constraints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl Bounds {
    /// Returns `None` when neither bound is set.
    pub fn new(min: Option<i32>, max: Option<i32>) -> Option<Self> {
        match (min, max) {
            (None, None) => None,
            (Some(lo), Some(hi)) if lo > hi => Some(Self {
                min: Some(hi),
                max: Some(lo),
            }),
            _ => Some(Self { min, max }),
        }
    }
}

/// Secondary modifier scaling a rule's weight under extra conditions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightMultiplier {
    pub multiplier: f32,
    pub condition_summary: String,
}

/// Sub-conditions a weight multiplier may carry, before summarization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiplierConditions {
    pub is_raining: Option<bool>,
    pub is_thundering: Option<bool>,
    pub time_range: Option<String>,
    pub min_lure_level: Option<u32>,
    pub moon_phase: Option<u8>,
}

impl MultiplierConditions {
    /// Short label: weather, time of day, lure level, moon phase, in that
    /// order, only the parts present, joined by `", "`. `"?"` when empty.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        match Weather::from_flags(self.is_raining, self.is_thundering) {
            Weather::Any => {}
            weather => parts.push(weather.to_string()),
        }
        if let Some(time) = self.time_range.as_deref().filter(|t| !t.trim().is_empty()) {
            parts.push(format!("time:{}", normalize_id(time)));
        }
        if let Some(lure) = self.min_lure_level {
            parts.push(format!("lure:{lure}"));
        }
        if let Some(moon) = self.moon_phase {
            parts.push(format!("moon:{moon}"));
        }

        if parts.is_empty() {
            "?".to_string()
        } else {
            parts.join(", ")
        }
    }

    pub fn into_multiplier(self, multiplier: f32) -> WeightMultiplier {
        WeightMultiplier {
            multiplier,
            condition_summary: self.summary(),
        }
    }
}

/// One normalized spawn rule for one species and form.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnCondition {
    pub biome_clauses: Vec<BiomeClause>,
    pub excluded_biome_clauses: Vec<BiomeClause>,
    pub time_of_day: TimeOfDay,
    pub weather: Weather,
    /// `None` when the rule sets no level constraint.
    pub level_range: Option<LevelRange>,
    pub rarity_bucket: String,
    pub weight: Option<f32>,
    pub y_range: Option<Bounds>,
    pub light_range: Option<Bounds>,
    pub sky_light_range: Option<Bounds>,
    pub can_see_sky: Option<bool>,
    pub moon_phase: Option<u8>,
    pub required_structures: Vec<String>,
    pub required_nearby_blocks: Vec<String>,
    pub required_base_blocks: Vec<String>,
    pub presets: Vec<String>,
    pub weight_multipliers: Vec<WeightMultiplier>,
    /// Spawn context such as `grounded` or `submerged`.
    pub context: Option<String>,
    /// Upstream rule identifier, when the source has one.
    pub source_id: Option<String>,
}

impl Default for SpawnCondition {
    fn default() -> Self {
        Self {
            biome_clauses: Vec::new(),
            excluded_biome_clauses: Vec::new(),
            time_of_day: TimeOfDay::Any,
            weather: Weather::Any,
            level_range: None,
            rarity_bucket: DEFAULT_BUCKET.to_string(),
            weight: None,
            y_range: None,
            light_range: None,
            sky_light_range: None,
            can_see_sky: None,
            moon_phase: None,
            required_structures: Vec::new(),
            required_nearby_blocks: Vec::new(),
            required_base_blocks: Vec::new(),
            presets: Vec::new(),
            weight_multipliers: Vec::new(),
            context: None,
            source_id: None,
        }
    }
}

impl SpawnCondition {
    /// Adds a positive clause unless the same reference is already present.
    pub fn push_biome(&mut self, clause: BiomeClause) {
        push_unique(&mut self.biome_clauses, clause);
    }

    /// Adds a negated clause unless the same reference is already present.
    pub fn push_excluded_biome(&mut self, clause: BiomeClause) {
        push_unique(&mut self.excluded_biome_clauses, clause);
    }

    /// Drops positive clauses whose reference is also excluded, then
    /// collapses clauses that share a display label, keeping the first.
    ///
    /// Called once at the end of normalization; afterwards the positive and
    /// excluded lists never share a member.
    pub fn finalize(&mut self) {
        let excluded: HashSet<&str> = self
            .excluded_biome_clauses
            .iter()
            .map(BiomeClause::reference)
            .collect();
        self.biome_clauses
            .retain(|clause| !excluded.contains(clause.reference()));
        dedupe_labels(&mut self.biome_clauses);
        dedupe_labels(&mut self.excluded_biome_clauses);
    }

    /// Returns true when no biome restriction applies.
    pub fn is_biome_unconstrained(&self) -> bool {
        self.biome_clauses.is_empty()
    }
}

fn push_unique(clauses: &mut Vec<BiomeClause>, clause: BiomeClause) {
    if !clauses
        .iter()
        .any(|existing| existing.reference() == clause.reference())
    {
        clauses.push(clause);
    }
}

fn dedupe_labels(clauses: &mut Vec<BiomeClause>) {
    let mut seen = HashSet::new();
    clauses.retain(|clause| seen.insert(clause.display_label.clone()));
}
