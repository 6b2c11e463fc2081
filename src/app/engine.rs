use crate::adapters::json::adapter::JsonTypeGraphSource;
use crate::app::dto::*;
use crate::domain::hierarchy::HierarchyGraph;
use crate::domain::method::{MethodId, MethodSig};
use crate::domain::ports::TypeGraphSource;
use crate::domain::relationship::{EdgeOrigin, RelationshipStore};
use crate::domain::resolver::{Cancellation, ResolveOptions, ResolveSummary, resolve_all};
use crate::domain::type_graph::TypeGraph;
use anyhow::{Context as _, Result};
use regex::RegexBuilder;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

/// Engine configuration (populated from CLI flags).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub resolve: ResolveOptions,
}

/// Returned (inside `anyhow::Error`) when a method id names nothing in the loaded graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodNotFound(pub String);

impl fmt::Display for MethodNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Method not found: {}", self.0)
    }
}

impl std::error::Error for MethodNotFound {}

#[derive(Clone)]
pub struct OverrideEngine {
    inner: Arc<RwLock<EngineData>>,
}

struct EngineData {
    graph_path: Option<PathBuf>,
    config: EngineConfig,
    graph: Arc<TypeGraph>,
    store: Arc<RelationshipStore>,
    summaries: Vec<ResolveSummary>,
    interface_cycles: Vec<Vec<String>>,
    base_cycles: Vec<Vec<String>>,
}

impl EngineData {
    fn analyze(graph_path: Option<PathBuf>, graph: TypeGraph, config: EngineConfig) -> Self {
        let hierarchy = HierarchyGraph::build(&graph);
        let interface_cycles = hierarchy.interface_cycles();
        let base_cycles = hierarchy.base_cycles();
        for cycle in &interface_cycles {
            warn!(types = ?cycle, "cyclic interface declaration");
        }
        for cycle in &base_cycles {
            warn!(types = ?cycle, "cyclic base type declaration");
        }

        let mut store = RelationshipStore::new();
        let summaries = resolve_all(&graph, &config.resolve, &mut store, &Cancellation::new());
        info!(
            units = summaries.len(),
            edges = store.len(),
            "override map ready"
        );

        Self {
            graph_path,
            config,
            graph: Arc::new(graph),
            store: Arc::new(store),
            summaries,
            interface_cycles,
            base_cycles,
        }
    }
}

impl OverrideEngine {
    /// Construct an engine from an already-built graph.
    ///
    /// Used for testing or when the graph comes from another loader.
    pub fn from_graph(graph: TypeGraph, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(EngineData::analyze(None, graph, config))),
        }
    }

    pub fn load_from_json(json_path: &Path, config: EngineConfig) -> Result<Self> {
        let graph = JsonTypeGraphSource::new(json_path)
            .load()
            .context("Failed to load type graph")?;
        Ok(Self {
            inner: Arc::new(RwLock::new(EngineData::analyze(
                Some(json_path.to_path_buf()),
                graph,
                config,
            ))),
        })
    }

    /// Re-read the graph file and rebuild the override map.
    pub fn reload(&self) -> Result<HealthResponse> {
        let (path, config) = {
            let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
            (data.graph_path.clone(), data.config)
        };
        let path = path.context("Engine was built from an in-memory graph; nothing to reload")?;
        let graph = JsonTypeGraphSource::new(&path)
            .load()
            .context("Failed to reload type graph")?;
        let fresh = EngineData::analyze(Some(path), graph, config);

        let mut data = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *data = fresh;
        Ok(health_of(&data))
    }

    pub fn health(&self) -> HealthResponse {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        health_of(&data)
    }

    /// Snapshot of the relationship store, for downstream reachability passes.
    pub fn store(&self) -> Arc<RelationshipStore> {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        data.store.clone()
    }

    pub fn graph(&self) -> Arc<TypeGraph> {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        data.graph.clone()
    }

    /// Slots that `method` overrides.
    pub fn bases(&self, method: &str) -> Result<RelationsResponse> {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let (id, sig) = lookup(&data.graph, method)?;
        let related = related_methods(&data, data.store.bases_of(&id), |base| {
            data.store.origin_of(base, &id)
        });
        Ok(RelationsResponse {
            method: method_info(sig),
            related,
        })
    }

    /// Methods that override the slot `method` declares.
    pub fn overrides(&self, method: &str) -> Result<RelationsResponse> {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let (id, sig) = lookup(&data.graph, method)?;
        let related = related_methods(&data, data.store.overrides_of(&id), |overriding| {
            data.store.origin_of(&id, overriding)
        });
        Ok(RelationsResponse {
            method: method_info(sig),
            related,
        })
    }

    pub fn stats(&self) -> StatsResponse {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let counts = data.store.origin_counts();
        let slot_roots = data
            .graph
            .methods()
            .filter(|m| m.is_virtual && data.store.bases_of(&m.id).is_empty())
            .count();

        StatsResponse {
            units: data
                .summaries
                .iter()
                .map(|s| UnitStats {
                    name: s.unit.clone(),
                    types_visited: s.types_visited,
                    virtual_methods_visited: s.virtual_methods_visited,
                    edges_found: s.edges_found,
                    edges_added: s.edges_added,
                    cancelled: s.cancelled,
                })
                .collect(),
            type_count: data.graph.len(),
            method_count: data.graph.method_count(),
            virtual_method_count: data.graph.virtual_method_count(),
            edge_count: data.store.len(),
            class_hierarchy_edges: counts.class_hierarchy,
            interface_edges: counts.interface,
            explicit_edges: counts.explicit,
            slot_roots,
            interface_cycles: data.interface_cycles.clone(),
            base_cycles: data.base_cycles.clone(),
        }
    }

    /// Case-insensitive regex search over method ids and names.
    pub fn search(&self, pattern: &str, limit: Option<usize>) -> Result<SearchResponse> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid search pattern: {pattern}"))?;

        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let mut matches: Vec<&MethodSig> = data
            .graph
            .methods()
            .filter(|m| regex.is_match(&m.id.to_string()) || regex.is_match(&m.name))
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));

        let total_matches = matches.len();
        let items = matches
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|m| SearchItem {
                method: method_info(m),
                base_count: data.store.bases_of(&m.id).len(),
                override_count: data.store.overrides_of(&m.id).len(),
            })
            .collect();

        Ok(SearchResponse {
            pattern: pattern.to_string(),
            total_matches,
            items,
        })
    }

    pub fn edges(&self) -> EdgesResponse {
        let data = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        let edges: Vec<EdgeDto> = data
            .store
            .edges()
            .into_iter()
            .map(|e| EdgeDto {
                base: e.base.to_string(),
                overriding: e.overriding.to_string(),
                origin: origin_name(e.origin).to_string(),
            })
            .collect();
        EdgesResponse {
            edge_count: edges.len(),
            edges,
        }
    }
}

fn health_of(data: &EngineData) -> HealthResponse {
    HealthResponse {
        graph_path: data
            .graph_path
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| "<in-memory>".to_string()),
        unit_count: data.graph.units().len(),
        type_count: data.graph.len(),
        method_count: data.graph.method_count(),
        edge_count: data.store.len(),
    }
}

fn lookup<'a>(graph: &'a TypeGraph, method: &str) -> Result<(MethodId, &'a MethodSig)> {
    let id: MethodId = method.parse()?;
    let sig = graph
        .resolve_method(&id)
        .ok_or_else(|| MethodNotFound(method.to_string()))?;
    Ok((id, sig))
}

fn related_methods(
    data: &EngineData,
    ids: &BTreeSet<MethodId>,
    origin: impl Fn(&MethodId) -> Option<EdgeOrigin>,
) -> Vec<RelatedMethod> {
    ids.iter()
        .filter_map(|id| {
            let sig = data.graph.resolve_method(id)?;
            Some(RelatedMethod {
                method: method_info(sig),
                origin: origin(id).map(origin_name).unwrap_or("unknown").to_string(),
            })
        })
        .collect()
}

fn method_info(sig: &MethodSig) -> MethodInfo {
    MethodInfo {
        id: sig.id.to_string(),
        declaring_type: sig.declaring_type().to_string(),
        name: sig.name.clone(),
        signature: sig.display_signature(),
        is_virtual: sig.is_virtual,
    }
}

pub fn origin_name(origin: EdgeOrigin) -> &'static str {
    match origin {
        EdgeOrigin::ClassHierarchy => "class_hierarchy",
        EdgeOrigin::Interface => "interface",
        EdgeOrigin::Explicit => "explicit",
    }
}
