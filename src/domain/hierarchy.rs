//! Declaration graph over loaded types, used to report malformed hierarchies before resolution.
//!
//! The resolver itself is cycle-safe; these diagnostics only tell the operator that the input
//! contains cycles, which a well-formed loader never produces.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::domain::type_graph::{TypeGraph, TypeId};

/// Which declaration an edge comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Base,
    Interface,
}

/// Directed graph type → declared base / interfaces, restricted to resolvable references.
pub struct HierarchyGraph {
    pub graph: DiGraph<TypeId, DeclarationKind>,
    pub type_to_node: HashMap<TypeId, NodeIndex>,
}

impl HierarchyGraph {
    pub fn build(types: &TypeGraph) -> Self {
        let mut graph = DiGraph::new();
        let mut type_to_node = HashMap::new();
        for node in types.types() {
            let idx = graph.add_node(node.name.clone());
            type_to_node.insert(node.name.clone(), idx);
        }

        for node in types.types() {
            let Some(&from) = type_to_node.get(&node.name) else {
                continue;
            };
            if let Some(&to) = types
                .base_of(node)
                .and_then(|base| type_to_node.get(&base.name))
            {
                graph.add_edge(from, to, DeclarationKind::Base);
            }
            for interface in node.interfaces.iter().filter_map(|i| types.resolve(i)) {
                if let Some(&to) = type_to_node.get(&interface.name) {
                    graph.add_edge(from, to, DeclarationKind::Interface);
                }
            }
        }

        Self {
            graph,
            type_to_node,
        }
    }

    /// Groups of types that (transitively) list themselves among their interfaces.
    pub fn interface_cycles(&self) -> Vec<Vec<TypeId>> {
        self.cycles_of(DeclarationKind::Interface)
    }

    /// Groups of types that (transitively) derive from themselves.
    pub fn base_cycles(&self) -> Vec<Vec<TypeId>> {
        self.cycles_of(DeclarationKind::Base)
    }

    fn cycles_of(&self, kind: DeclarationKind) -> Vec<Vec<TypeId>> {
        let filtered = self
            .graph
            .filter_map(|_, n| Some(n.clone()), |_, e| (*e == kind).then_some(*e));

        let mut cycles: Vec<Vec<TypeId>> = tarjan_scc(&filtered)
            .into_iter()
            .filter(|scc| scc.len() > 1 || filtered.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut names: Vec<TypeId> = scc.into_iter().map(|i| filtered[i].clone()).collect();
                names.sort();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }
}
