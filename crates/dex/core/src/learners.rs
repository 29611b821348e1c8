//! Forward per-species relations and the entries of the reverse indices.

use std::fmt;

use crate::label::normalize_id;

/// How a species learns a move.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LearnMethod {
    LevelUp,
    Egg,
    Tm,
    Tutor,
    Legacy,
    Special,
    FormChange,
    /// Prefix the layer does not know, kept verbatim.
    Other(String),
}

impl LearnMethod {
    fn from_prefix(prefix: &str) -> Self {
        match prefix {
            "egg" => Self::Egg,
            "tm" => Self::Tm,
            "tutor" => Self::Tutor,
            "legacy" => Self::Legacy,
            "special" => Self::Special,
            "form_change" => Self::FormChange,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::LevelUp => "level",
            Self::Egg => "egg",
            Self::Tm => "tm",
            Self::Tutor => "tutor",
            Self::Legacy => "legacy",
            Self::Special => "special",
            Self::FormChange => "form_change",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for LearnMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a species' move catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LearnsetEntry {
    pub move_id: String,
    pub method: LearnMethod,
    pub level: Option<u32>,
}

impl LearnsetEntry {
    /// Parses the `"<prefix>:<move>"` encoding.
    ///
    /// A numeric prefix is a level-up move at that level; an entry without a
    /// prefix is treated as a level-up move with no known level.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (method, level, move_id) = match raw.split_once(':') {
            Some((prefix, move_id)) => {
                let prefix = normalize_id(prefix);
                match prefix.parse::<u32>() {
                    Ok(level) => (LearnMethod::LevelUp, Some(level), move_id),
                    Err(_) => (LearnMethod::from_prefix(&prefix), None, move_id),
                }
            }
            None => (LearnMethod::LevelUp, None, raw),
        };
        let move_id = normalize_id(move_id);
        if move_id.is_empty() {
            return None;
        }
        Some(Self {
            move_id,
            method,
            level,
        })
    }
}

/// One ability slot of a species.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySlot {
    pub ability_id: String,
    pub is_hidden: bool,
}

impl AbilitySlot {
    /// Parses `"static"` or the hidden-ability encoding `"h:static"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (ability, is_hidden) = match raw.strip_prefix("h:") {
            Some(rest) => (rest, true),
            None => (raw, false),
        };
        let ability_id = normalize_id(ability);
        (!ability_id.is_empty()).then_some(Self {
            ability_id,
            is_hidden,
        })
    }
}

/// Inclusive quantity range of an item drop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantityRange {
    pub min: u32,
    pub max: u32,
}

impl QuantityRange {
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Parses `"1-3"` or `"2"`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw.split_once('-') {
            Some((lo, hi)) => Some(Self::new(lo.trim().parse().ok()?, hi.trim().parse().ok()?)),
            None => raw.parse().ok().map(|n| Self::new(n, n)),
        }
    }
}

impl Default for QuantityRange {
    fn default() -> Self {
        Self { min: 1, max: 1 }
    }
}

impl fmt::Display for QuantityRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

/// One entry of a species' drop table.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropEntry {
    pub item_id: String,
    pub percentage: f32,
    pub quantity: QuantityRange,
}

/// Contribution stored in a reverse index.
///
/// The index deduplicates contributions by [`identity`](Self::identity) and
/// orders them by [`ordinal`](Self::ordinal), then entity id.
pub trait IndexEntry: Clone + Send + Sync + 'static {
    fn entity_id(&self) -> &str;
    fn ordinal(&self) -> u32;
    fn identity(&self) -> String;
}

/// A species that learns a given move.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveLearner {
    pub entity_id: String,
    pub ordinal: u32,
    pub method: LearnMethod,
    pub level: Option<u32>,
}

impl IndexEntry for MoveLearner {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn ordinal(&self) -> u32 {
        self.ordinal
    }

    fn identity(&self) -> String {
        match self.level {
            Some(level) => format!("{}|{}|{}", self.entity_id, self.method, level),
            None => format!("{}|{}", self.entity_id, self.method),
        }
    }
}

/// A species that can have a given ability.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityBearer {
    pub entity_id: String,
    pub ordinal: u32,
    pub is_hidden: bool,
}

impl IndexEntry for AbilityBearer {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn ordinal(&self) -> u32 {
        self.ordinal
    }

    fn identity(&self) -> String {
        format!("{}|{}", self.entity_id, self.is_hidden)
    }
}

/// A species that drops a given item.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDropper {
    pub entity_id: String,
    pub ordinal: u32,
    pub percentage: f32,
    pub quantity: QuantityRange,
}

impl IndexEntry for ItemDropper {
    fn entity_id(&self) -> &str {
        &self.entity_id
    }

    fn ordinal(&self) -> u32 {
        self.ordinal
    }

    fn identity(&self) -> String {
        self.entity_id.clone()
    }
}
