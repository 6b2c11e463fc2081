//! Relationship Store - the base ↔ override edges discovered by the resolver.
//!
//! Set-backed and append-only: recording the same (base, override) pair twice is a no-op, so
//! running the pass again over an unchanged graph cannot double-count. Both directions are
//! indexed for the reachability pass.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

use crate::domain::method::MethodId;

/// How an edge was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    /// Nearest matching slot in the base-class chain.
    ClassHierarchy,
    /// First matching slot in the interface forest.
    Interface,
    /// Explicit override reference in metadata.
    Explicit,
}

/// A discovered relationship: `overriding` fills the slot declared by `base`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub base: MethodId,
    pub overriding: MethodId,
    pub origin: EdgeOrigin,
}

impl Edge {
    pub fn new(base: MethodId, overriding: MethodId, origin: EdgeOrigin) -> Self {
        Self {
            base,
            overriding,
            origin,
        }
    }
}

static NO_METHODS: BTreeSet<MethodId> = BTreeSet::new();

/// Edge counts per origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginCounts {
    pub class_hierarchy: usize,
    pub interface: usize,
    pub explicit: usize,
}

#[derive(Debug, Default, Clone)]
pub struct RelationshipStore {
    /// override -> its bases
    bases: HashMap<MethodId, BTreeSet<MethodId>>,
    /// base -> its overrides
    overrides: HashMap<MethodId, BTreeSet<MethodId>>,
    /// (base, override) -> origin of the first recording
    origins: HashMap<(MethodId, MethodId), EdgeOrigin>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `overriding` overrides `base`. Returns false if the pair was already known,
    /// in which case the first origin is kept.
    pub fn record_edge(&mut self, base: MethodId, overriding: MethodId, origin: EdgeOrigin) -> bool {
        let key = (base, overriding);
        if self.origins.contains_key(&key) {
            return false;
        }
        let (base, overriding) = key;
        self.bases
            .entry(overriding.clone())
            .or_default()
            .insert(base.clone());
        self.overrides
            .entry(base.clone())
            .or_default()
            .insert(overriding.clone());
        self.origins.insert((base, overriding), origin);
        true
    }

    pub fn record(&mut self, edge: Edge) -> bool {
        self.record_edge(edge.base, edge.overriding, edge.origin)
    }

    /// Merge a batch of edges in order; returns how many were new.
    pub fn extend<I: IntoIterator<Item = Edge>>(&mut self, edges: I) -> usize {
        let mut added = 0;
        for edge in edges {
            if self.record(edge) {
                added += 1;
            }
        }
        added
    }

    /// Slots that `method` overrides.
    pub fn bases_of(&self, method: &MethodId) -> &BTreeSet<MethodId> {
        self.bases.get(method).unwrap_or(&NO_METHODS)
    }

    /// Methods overriding the slot declared by `method`.
    pub fn overrides_of(&self, method: &MethodId) -> &BTreeSet<MethodId> {
        self.overrides.get(method).unwrap_or(&NO_METHODS)
    }

    pub fn contains(&self, base: &MethodId, overriding: &MethodId) -> bool {
        self.overrides_of(base).contains(overriding)
    }

    pub fn origin_of(&self, base: &MethodId, overriding: &MethodId) -> Option<EdgeOrigin> {
        self.origins
            .get(&(base.clone(), overriding.clone()))
            .copied()
    }

    /// All edges, sorted by (base, override).
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .origins
            .iter()
            .map(|((base, overriding), origin)| Edge::new(base.clone(), overriding.clone(), *origin))
            .collect();
        edges.sort();
        edges
    }

    pub fn origin_counts(&self) -> OriginCounts {
        let mut counts = OriginCounts::default();
        for origin in self.origins.values() {
            match origin {
                EdgeOrigin::ClassHierarchy => counts.class_hierarchy += 1,
                EdgeOrigin::Interface => counts.interface += 1,
                EdgeOrigin::Explicit => counts.explicit += 1,
            }
        }
        counts
    }

    /// Number of distinct (base, override) pairs.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Export as a directed graph, edges pointing base → override.
    pub fn to_graph(&self) -> RelationshipGraph {
        let mut graph = RelationshipGraph::new();
        for edge in self.edges() {
            let base = graph.get_or_add(&edge.base);
            let overriding = graph.get_or_add(&edge.overriding);
            graph.graph.add_edge(base, overriding, edge.origin);
        }
        graph
    }
}

/// Relationship edges as a petgraph digraph, for reachability consumers.
pub struct RelationshipGraph {
    pub graph: DiGraph<MethodId, EdgeOrigin>,
    pub method_to_node: HashMap<MethodId, NodeIndex>,
}

impl Default for RelationshipGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            method_to_node: HashMap::new(),
        }
    }

    fn get_or_add(&mut self, method: &MethodId) -> NodeIndex {
        if let Some(&idx) = self.method_to_node.get(method) {
            return idx;
        }
        let idx = self.graph.add_node(method.clone());
        self.method_to_node.insert(method.clone(), idx);
        idx
    }

    pub fn get_node(&self, method: &MethodId) -> Option<NodeIndex> {
        self.method_to_node.get(method).copied()
    }

    /// Every method that must be kept once `method` is kept, following edges in both
    /// directions.
    pub fn dispatch_group(&self, method: &MethodId) -> BTreeSet<MethodId> {
        let mut group = BTreeSet::new();
        let Some(start) = self.get_node(method) else {
            return group;
        };
        let mut seen = HashSet::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            group.insert(self.graph[idx].clone());
            stack.extend(self.graph.neighbors_undirected(idx));
        }
        group
    }
}
