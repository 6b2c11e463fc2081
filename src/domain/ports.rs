use crate::domain::type_graph::TypeGraph;
use anyhow::Result;

/// Type graph source port (implemented by the metadata-loading side)
pub trait TypeGraphSource {
    /// Load and freeze the full type graph.
    fn load(&self) -> Result<TypeGraph>;
}
