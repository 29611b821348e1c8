//! Evolution trees rebuilt from flat per-species links.
//!
//! Species only know their direct pre-evolution and direct evolutions. The
//! resolver walks up to the basal ancestor, then expands the tree downward,
//! guarding against cycles and against chains deeper than
//! [`MAX_EVOLUTION_DEPTH`]. Trees are memoized per queried species.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use dex_content::StaticLibrary;
use dex_core::{EvoNode, EvolutionEdge, MAX_EVOLUTION_DEPTH, normalize_id};

use crate::library::SharedLibrary;
use crate::live::LiveSource;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Child {
    id: String,
    transition: String,
}

/// Parent and child links merged from both sources.
#[derive(Debug, Default)]
struct EvolutionLinks {
    parents: HashMap<String, String>,
    children: HashMap<String, Vec<Child>>,
}

impl EvolutionLinks {
    fn build(live: &dyn LiveSource, library: &StaticLibrary) -> Self {
        let mut links = Self::default();

        let live_species = live.species().unwrap_or_else(|e| {
            tracing::debug!("Live species unavailable for evolution links: {}", e);
            Vec::new()
        });
        let live_species: Vec<_> = live_species
            .iter()
            .filter_map(|species| Some((normalize_id(&species.id().ok()?), species)))
            .filter(|(id, _)| !id.is_empty())
            .collect();

        // Parents, highest priority first.
        for (id, species) in &live_species {
            if let Ok(Some(pre)) = species.pre_evolution() {
                links.set_parent(id, &pre);
            }
        }
        for (id, doc) in library.species_documents() {
            if let Some(pre) = doc.pre_evolution() {
                links.set_parent(id, &pre);
            }
        }
        for (id, doc) in library.species_documents() {
            for edge in doc.evolution_edges() {
                links.set_parent(&edge.target, id);
            }
        }
        for (id, species) in &live_species {
            for target in species.evolution_targets().unwrap_or_default() {
                links.set_parent(&target, id);
            }
        }

        // Children: live targets, then static edges with their requirements,
        // then species that only name their pre-evolution.
        for (id, species) in &live_species {
            for target in species.evolution_targets().unwrap_or_default() {
                links.add_child(id, &target, String::new());
            }
        }
        for (id, doc) in library.species_documents() {
            for (target, edges) in group_by_target(doc.evolution_edges()) {
                links.add_child(id, &target, EvolutionEdge::combined_label(&edges));
            }
        }
        for (id, species) in &live_species {
            if let Ok(Some(pre)) = species.pre_evolution() {
                links.add_child(&pre, id, String::new());
            }
        }
        for (id, doc) in library.species_documents() {
            if let Some(pre) = doc.pre_evolution() {
                links.add_child(&pre, id, String::new());
            }
        }

        tracing::debug!(
            parents = links.parents.len(),
            families = links.children.len(),
            "Evolution links built"
        );
        links
    }

    fn set_parent(&mut self, child: &str, parent: &str) {
        let (child, parent) = (normalize_id(child), normalize_id(parent));
        if child.is_empty() || parent.is_empty() || child == parent {
            return;
        }
        self.parents.entry(child).or_insert(parent);
    }

    /// Adds a child once; a later source may only fill in a missing
    /// transition label.
    fn add_child(&mut self, parent: &str, child: &str, transition: String) {
        let (parent, child) = (normalize_id(parent), normalize_id(child));
        if child.is_empty() || parent.is_empty() || child == parent {
            return;
        }
        let children = self.children.entry(parent).or_default();
        match children.iter_mut().find(|existing| existing.id == child) {
            Some(existing) if existing.transition.is_empty() => existing.transition = transition,
            Some(_) => {}
            None => children.push(Child {
                id: child,
                transition,
            }),
        }
    }

    /// Basal ancestor of `id`.
    fn root_of(&self, id: &str) -> String {
        let mut current = id.to_string();
        let mut visited = HashSet::from([current.clone()]);

        for _ in 0..MAX_EVOLUTION_DEPTH {
            let Some(parent) = self.parents.get(&current) else {
                return current;
            };
            if !visited.insert(parent.clone()) {
                tracing::debug!("Evolution cycle through {} while finding root of {}", parent, id);
                return current;
            }
            current = parent.clone();
        }
        tracing::debug!("Evolution depth bound reached while finding root of {}", id);
        current
    }

    fn expand(&self, id: &str, target: &str, transition: String, path: &mut Vec<String>) -> EvoNode {
        let mut node = EvoNode::leaf(id, id == target, transition);
        if path.len() + 1 >= MAX_EVOLUTION_DEPTH {
            tracing::debug!("Evolution depth bound reached below {}", id);
            return node;
        }

        path.push(id.to_string());
        for child in self.children.get(id).into_iter().flatten() {
            if path.contains(&child.id) {
                tracing::debug!("Skipping evolution cycle {} -> {}", id, child.id);
                continue;
            }
            let expanded = self.expand(&child.id, target, child.transition.clone(), path);
            node.children.push(expanded);
        }
        path.pop();
        node
    }
}

/// Groups edges by target in order of first appearance.
fn group_by_target(edges: Vec<EvolutionEdge>) -> Vec<(String, Vec<EvolutionEdge>)> {
    let mut groups: Vec<(String, Vec<EvolutionEdge>)> = Vec::new();
    for edge in edges {
        match groups.iter_mut().find(|(target, _)| *target == edge.target) {
            Some((_, group)) => group.push(edge),
            None => groups.push((edge.target.clone(), vec![edge])),
        }
    }
    groups
}

pub struct EvolutionGraphResolver {
    live: Arc<dyn LiveSource>,
    library: Arc<SharedLibrary>,
    links: OnceLock<EvolutionLinks>,
    memo: DashMap<String, Option<Arc<EvoNode>>>,
}

impl EvolutionGraphResolver {
    pub fn new(live: Arc<dyn LiveSource>, library: Arc<SharedLibrary>) -> Self {
        Self {
            live,
            library,
            links: OnceLock::new(),
            memo: DashMap::new(),
        }
    }

    /// Evolution family of `entity`, rooted at its basal ancestor, with the
    /// queried node flagged. `None` for a single-stage species.
    pub fn tree_of(&self, entity: &str) -> Option<Arc<EvoNode>> {
        let id = normalize_id(entity);
        if id.is_empty() {
            return None;
        }
        if let Some(hit) = self.memo.get(&id) {
            return hit.value().clone();
        }

        let links = self.links();
        let root = links.root_of(&id);
        let tree = links.expand(&root, &id, String::new(), &mut Vec::new());
        let tree = (!tree.children.is_empty()).then(|| Arc::new(tree));

        self.memo.insert(id, tree.clone());
        tree
    }

    fn links(&self) -> &EvolutionLinks {
        self.links
            .get_or_init(|| EvolutionLinks::build(self.live.as_ref(), &self.library.get()))
    }

    /// Whether the link tables have been built.
    pub fn is_ready(&self) -> bool {
        self.links.get().is_some()
    }

    /// Builds the link tables ahead of the first query.
    pub fn warm_up(&self) {
        self.links();
    }

    /// Number of memoized queries.
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }
}
