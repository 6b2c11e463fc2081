//! Override Resolver - maps every virtual method to the slot(s) it overrides.
//!
//! For each virtual method three independent lookups run:
//! 1. the nearest ancestor in the base-class chain declaring a matching virtual method,
//! 2. the first matching method in a pre-order walk of the declaring type's interface forest,
//! 3. every explicit override reference, resolved directly.
//!
//! Unresolvable references end a branch of the search; they are never errors. Each type's work
//! depends only on the frozen [`TypeGraph`], so types can be resolved in parallel into private
//! buffers and merged afterwards.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::domain::method::MethodSig;
use crate::domain::relationship::{Edge, EdgeOrigin, RelationshipStore};
use crate::domain::signature::signatures_match;
use crate::domain::type_graph::{LoadingUnit, TypeGraph, TypeNode};
use crate::domain::type_ref::MatchOptions;

/// Resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveOptions {
    pub match_options: MatchOptions,
    /// Resolve the types of a unit on the rayon pool.
    pub parallel: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            match_options: MatchOptions::default(),
            parallel: true,
        }
    }
}

/// Cooperative cancellation, checked between per-type resolutions.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Outcome of resolving one loading unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveSummary {
    pub unit: String,
    pub types_visited: usize,
    pub virtual_methods_visited: usize,
    /// Edges produced, including pairs the store already knew.
    pub edges_found: usize,
    /// Edges that were new to the store.
    pub edges_added: usize,
    pub cancelled: bool,
}

pub struct OverrideResolver<'g> {
    graph: &'g TypeGraph,
    options: MatchOptions,
}

impl<'g> OverrideResolver<'g> {
    pub fn new(graph: &'g TypeGraph, options: MatchOptions) -> Self {
        Self { graph, options }
    }

    /// Nearest ancestor method occupying the same slot as `method`.
    ///
    /// Stops at the first ancestor level with a match, and at the first unresolved base.
    pub fn base_method_in_type_hierarchy(
        &self,
        declaring: &'g TypeNode,
        method: &MethodSig,
    ) -> Option<&'g MethodSig> {
        let mut visited: HashSet<&'g str> = HashSet::new();
        visited.insert(declaring.name.as_str());

        let mut current = declaring;
        loop {
            let Some(base_ref) = &current.base else {
                return None;
            };
            let Some(ancestor) = self.graph.resolve(base_ref) else {
                trace!(ty = %current.name, base = %base_ref, "base type not loaded");
                return None;
            };
            if !visited.insert(ancestor.name.as_str()) {
                warn!(ty = %declaring.name, ancestor = %ancestor.name, "cyclic base chain");
                return None;
            }
            if let Some(found) = self.try_match_method(ancestor, method) {
                return Some(found);
            }
            current = ancestor;
        }
    }

    /// First interface method, in pre-order over the declaring type's own interface list, that
    /// occupies the same slot as `method`.
    pub fn base_method_in_interface_hierarchy(
        &self,
        declaring: &'g TypeNode,
        method: &MethodSig,
    ) -> Option<&'g MethodSig> {
        let mut visited: HashSet<&'g str> = HashSet::new();
        visited.insert(declaring.name.as_str());
        self.search_interfaces(declaring, method, &mut visited)
    }

    fn search_interfaces(
        &self,
        ty: &'g TypeNode,
        method: &MethodSig,
        visited: &mut HashSet<&'g str>,
    ) -> Option<&'g MethodSig> {
        for interface_ref in &ty.interfaces {
            let Some(interface) = self.graph.resolve(interface_ref) else {
                trace!(ty = %ty.name, interface = %interface_ref, "interface not loaded");
                continue;
            };
            // Cycles and shared diamond ancestors are walked once.
            if !visited.insert(interface.name.as_str()) {
                continue;
            }

            if let Some(found) = self.try_match_method(interface, method) {
                return Some(found);
            }

            if let Some(found) = self.search_interfaces(interface, method, visited) {
                return Some(found);
            }
        }
        None
    }

    fn try_match_method(&self, ty: &'g TypeNode, method: &MethodSig) -> Option<&'g MethodSig> {
        ty.methods
            .iter()
            .find(|candidate| signatures_match(candidate, method, &self.options))
    }

    /// Targets of `method`'s explicit override references that resolve to virtual methods.
    pub fn explicit_bases(&self, method: &MethodSig) -> Vec<&'g MethodSig> {
        let mut targets = Vec::with_capacity(method.explicit_overrides.len());
        for reference in &method.explicit_overrides {
            match self.graph.resolve_method(reference) {
                None => {
                    debug!(method = %method.id, target = %reference, "explicit override target not loaded");
                }
                Some(target) if !target.is_virtual => {
                    warn!(method = %method.id, target = %reference, "explicit override targets a non-virtual method");
                }
                Some(target) => targets.push(target),
            }
        }
        targets
    }

    /// All edges for one method declared on `declaring`. Non-virtual methods yield nothing.
    pub fn resolve_method_edges(&self, declaring: &'g TypeNode, method: &MethodSig) -> Vec<Edge> {
        let mut edges = Vec::new();
        if !method.is_virtual {
            return edges;
        }

        if let Some(base) = self.base_method_in_type_hierarchy(declaring, method) {
            edges.push(Edge::new(
                base.id.clone(),
                method.id.clone(),
                EdgeOrigin::ClassHierarchy,
            ));
        }

        if let Some(base) = self.base_method_in_interface_hierarchy(declaring, method) {
            edges.push(Edge::new(
                base.id.clone(),
                method.id.clone(),
                EdgeOrigin::Interface,
            ));
        }

        for target in self.explicit_bases(method) {
            edges.push(Edge::new(
                target.id.clone(),
                method.id.clone(),
                EdgeOrigin::Explicit,
            ));
        }

        for edge in &edges {
            debug!(base = %edge.base, overriding = %edge.overriding, origin = ?edge.origin, "override edge");
        }
        edges
    }

    /// All edges for the virtual methods of one type.
    pub fn resolve_type_edges(&self, ty: &'g TypeNode) -> Vec<Edge> {
        ty.virtual_methods()
            .flat_map(|method| self.resolve_method_edges(ty, method))
            .collect()
    }

    fn unit_types(&self, unit: &LoadingUnit) -> Vec<&'g TypeNode> {
        unit.types.iter().filter_map(|id| self.graph.get(id)).collect()
    }

    /// Resolve a unit sequentially, writing straight into `store`.
    pub fn resolve_unit(
        &self,
        unit: &LoadingUnit,
        store: &mut RelationshipStore,
        cancel: &Cancellation,
    ) -> ResolveSummary {
        let mut summary = ResolveSummary {
            unit: unit.name.clone(),
            ..Default::default()
        };

        for ty in self.unit_types(unit) {
            if cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let edges = self.resolve_type_edges(ty);
            summary.types_visited += 1;
            summary.virtual_methods_visited += ty.virtual_methods().count();
            summary.edges_found += edges.len();
            summary.edges_added += store.extend(edges);
        }
        summary
    }

    /// Resolve a unit on the rayon pool. Each type fills a private buffer; buffers are merged in
    /// declaration order, so the store ends up identical to [`Self::resolve_unit`]'s.
    pub fn resolve_unit_parallel(
        &self,
        unit: &LoadingUnit,
        store: &mut RelationshipStore,
        cancel: &Cancellation,
    ) -> ResolveSummary {
        let types = self.unit_types(unit);
        let buffers: Vec<Option<(usize, Vec<Edge>)>> = types
            .par_iter()
            .map(|ty| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some((ty.virtual_methods().count(), self.resolve_type_edges(ty)))
            })
            .collect();

        let mut summary = ResolveSummary {
            unit: unit.name.clone(),
            ..Default::default()
        };
        for buffer in buffers {
            let Some((virtual_methods, edges)) = buffer else {
                summary.cancelled = true;
                continue;
            };
            summary.types_visited += 1;
            summary.virtual_methods_visited += virtual_methods;
            summary.edges_found += edges.len();
            summary.edges_added += store.extend(edges);
        }
        summary
    }
}

/// Resolve one loading unit with default matching, sequentially.
pub fn resolve_overrides_for_assembly(
    graph: &TypeGraph,
    unit: &LoadingUnit,
    store: &mut RelationshipStore,
) -> ResolveSummary {
    OverrideResolver::new(graph, MatchOptions::default()).resolve_unit(
        unit,
        store,
        &Cancellation::new(),
    )
}

/// Resolve every unit of the graph, in load order.
pub fn resolve_all(
    graph: &TypeGraph,
    options: &ResolveOptions,
    store: &mut RelationshipStore,
    cancel: &Cancellation,
) -> Vec<ResolveSummary> {
    let resolver = OverrideResolver::new(graph, options.match_options);
    let mut summaries = Vec::with_capacity(graph.units().len());
    // A cancelled run still reports every unit, each flagged as cancelled.
    for unit in graph.units() {
        let summary = if options.parallel {
            resolver.resolve_unit_parallel(unit, store, cancel)
        } else {
            resolver.resolve_unit(unit, store, cancel)
        };
        info!(
            unit = %summary.unit,
            types = summary.types_visited,
            virtual_methods = summary.virtual_methods_visited,
            edges = summary.edges_added,
            cancelled = summary.cancelled,
            "resolved overrides"
        );
        summaries.push(summary);
    }
    summaries
}
