use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HealthResponse {
    pub graph_path: String,
    pub unit_count: usize,
    pub type_count: usize,
    pub method_count: usize,
    pub edge_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MethodRequest {
    /// Method id in `Namespace.Type#token` form.
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MethodInfo {
    pub id: String,
    pub declaring_type: String,
    pub name: String,
    pub signature: String,
    pub is_virtual: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RelatedMethod {
    pub method: MethodInfo,
    /// class_hierarchy | interface | explicit
    pub origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RelationsResponse {
    pub method: MethodInfo,
    pub related: Vec<RelatedMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UnitStats {
    pub name: String,
    pub types_visited: usize,
    pub virtual_methods_visited: usize,
    pub edges_found: usize,
    pub edges_added: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatsResponse {
    pub units: Vec<UnitStats>,
    pub type_count: usize,
    pub method_count: usize,
    pub virtual_method_count: usize,
    pub edge_count: usize,
    pub class_hierarchy_edges: usize,
    pub interface_edges: usize,
    pub explicit_edges: usize,
    /// Virtual methods that override nothing (first slot of their hierarchy).
    pub slot_roots: usize,
    pub interface_cycles: Vec<Vec<String>>,
    pub base_cycles: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchRequest {
    pub pattern: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchItem {
    pub method: MethodInfo,
    pub base_count: usize,
    pub override_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    pub pattern: String,
    pub total_matches: usize,
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EdgeDto {
    pub base: String,
    pub overriding: String,
    pub origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EdgesResponse {
    pub edge_count: usize,
    pub edges: Vec<EdgeDto>,
}
