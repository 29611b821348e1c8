//! Evolution trees and transition requirements.

use std::fmt;

use crate::label::{format_label, strip_namespace};

/// Upper bound on ancestor walks and tree descent.
///
/// Real families are at most three stages deep; the bound only stops
/// malformed upstream data from looping.
pub const MAX_EVOLUTION_DEPTH: usize = 10;

/// One requirement of an evolution transition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Requirement {
    Level { min: u32 },
    HeldItem(String),
    UseItem(String),
    Friendship(u32),
    TimeOfDay(String),
    Biome(String),
    Weather { rain: bool, thunder: bool },
    MoveKnown(String),
    MoveType(String),
    PartyMember(String),
    Trade,
    Gender(String),
    StatCompare { high: String, low: String },
    Structure(String),
    MoonPhase(u8),
    DefeatCount(u32),
    /// Requirement kind the layer does not recognize; rendered as the raw
    /// variant name so it stays visible.
    Unknown(String),
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Level { min } => write!(f, "Lv. {min}"),
            Self::HeldItem(item) => write!(f, "held:{}", strip_namespace(item)),
            Self::UseItem(item) => write!(f, "item:{}", strip_namespace(item)),
            Self::Friendship(amount) => write!(f, "friendship:{amount}"),
            Self::TimeOfDay(range) => write!(f, "time:{range}"),
            Self::Biome(biome) => write!(f, "biome:{}", format_label(biome)),
            Self::Weather { thunder: true, .. } => f.write_str("thunder"),
            Self::Weather { rain: true, .. } => f.write_str("rain"),
            Self::Weather { .. } => f.write_str("clear"),
            Self::MoveKnown(mv) => write!(f, "move:{}", strip_namespace(mv)),
            Self::MoveType(kind) => write!(f, "move_type:{kind}"),
            Self::PartyMember(species) => write!(f, "party:{species}"),
            Self::Trade => f.write_str("trade"),
            Self::Gender(gender) => write!(f, "gender:{gender}"),
            Self::StatCompare { high, low } => write!(f, "stat:{high}>{low}"),
            Self::Structure(id) => write!(f, "structure:{}", strip_namespace(id)),
            Self::MoonPhase(phase) => write!(f, "moon:{phase}"),
            Self::DefeatCount(n) => write!(f, "defeat:{n}"),
            Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

/// A directed evolution edge carrying its requirements.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvolutionEdge {
    pub target: String,
    pub requirements: Vec<Requirement>,
}

impl EvolutionEdge {
    pub fn new(target: impl Into<String>, requirements: Vec<Requirement>) -> Self {
        Self {
            target: target.into(),
            requirements,
        }
    }

    /// Requirements joined with `" + "`.
    pub fn transition_label(&self) -> String {
        self.requirements
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// Combined label of several edges into the same target, joined by `"; "`.
    pub fn combined_label<'a>(edges: impl IntoIterator<Item = &'a EvolutionEdge>) -> String {
        let labels: Vec<String> = edges
            .into_iter()
            .map(EvolutionEdge::transition_label)
            .filter(|label| !label.is_empty())
            .collect();
        labels.join("; ")
    }
}

/// One node of an evolution tree.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvoNode {
    pub entity_id: String,
    pub children: Vec<EvoNode>,
    /// True for the node of the entity the tree was requested for.
    pub is_target_entity: bool,
    /// How the parent evolves into this node; empty for the root and for
    /// edges known only from the live source.
    pub transition_condition: String,
}

impl EvoNode {
    pub fn leaf(entity_id: impl Into<String>, is_target_entity: bool, transition: String) -> Self {
        Self {
            entity_id: entity_id.into(),
            children: Vec::new(),
            is_target_entity,
            transition_condition: transition,
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(EvoNode::node_count).sum::<usize>()
    }

    /// Number of stages along the longest path.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(EvoNode::depth).max().unwrap_or(0)
    }

    pub fn find(&self, entity_id: &str) -> Option<&EvoNode> {
        if self.entity_id == entity_id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(entity_id))
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.find(entity_id).is_some()
    }

    /// The node flagged as the queried entity, if any.
    pub fn target(&self) -> Option<&EvoNode> {
        if self.is_target_entity {
            return Some(self);
        }
        self.children.iter().find_map(EvoNode::target)
    }

    /// Every root-to-leaf path as a list of entity ids.
    pub fn paths(&self) -> Vec<Vec<&str>> {
        if self.children.is_empty() {
            return vec![vec![self.entity_id.as_str()]];
        }
        self.children
            .iter()
            .flat_map(EvoNode::paths)
            .map(|mut path| {
                path.insert(0, self.entity_id.as_str());
                path
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirement_rendering() {
        assert_eq!(Requirement::Level { min: 16 }.to_string(), "Lv. 16");
        assert_eq!(
            Requirement::UseItem("cobblemon:fire-stone".into()).to_string(),
            "item:fire-stone"
        );
        assert_eq!(Requirement::Friendship(220).to_string(), "friendship:220");
        assert_eq!(
            Requirement::Weather {
                rain: true,
                thunder: true
            }
            .to_string(),
            "thunder"
        );
        assert_eq!(
            Requirement::Unknown("blocks_traveled".into()).to_string(),
            "blocks_traveled"
        );
    }

    #[test]
    fn edge_labels_join() {
        let edge = EvolutionEdge::new(
            "espeon",
            vec![Requirement::Friendship(160), Requirement::TimeOfDay("day".into())],
        );
        assert_eq!(edge.transition_label(), "friendship:160 + time:day");

        let trade = EvolutionEdge::new("espeon", vec![Requirement::Trade]);
        let empty = EvolutionEdge::new("espeon", vec![]);
        assert_eq!(
            EvolutionEdge::combined_label([&edge, &empty, &trade]),
            "friendship:160 + time:day; trade"
        );
    }

    #[test]
    fn tree_queries() {
        let mut root = EvoNode::leaf("eevee", false, String::new());
        root.children.push(EvoNode::leaf("vaporeon", true, "item:water_stone".into()));
        root.children.push(EvoNode::leaf("jolteon", false, "item:thunder_stone".into()));

        assert_eq!(root.node_count(), 3);
        assert_eq!(root.depth(), 2);
        assert!(root.contains("jolteon"));
        assert_eq!(root.target().map(|n| n.entity_id.as_str()), Some("vaporeon"));
        assert_eq!(root.paths(), vec![vec!["eevee", "vaporeon"], vec!["eevee", "jolteon"]]);
    }
}
