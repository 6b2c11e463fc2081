use crate::adapters::json::document::TypeGraphDocument;
use crate::domain::ports::TypeGraphSource;
use crate::domain::type_graph::TypeGraph;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tracing::info;

/// JSON type graph source adapter
pub struct JsonTypeGraphSource {
    pub graph_path: PathBuf,
}

impl JsonTypeGraphSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            graph_path: path.as_ref().to_path_buf(),
        }
    }
}

impl TypeGraphSource for JsonTypeGraphSource {
    fn load(&self) -> Result<TypeGraph> {
        let document = load_document(&self.graph_path)?;
        let graph = document
            .into_graph()
            .with_context(|| format!("Invalid type graph: {}", self.graph_path.display()))?;
        info!(
            path = %self.graph_path.display(),
            units = graph.units().len(),
            types = graph.len(),
            methods = graph.method_count(),
            "loaded type graph"
        );
        Ok(graph)
    }
}

fn load_document(path: &Path) -> Result<TypeGraphDocument> {
    use memmap2::Mmap;
    use std::fs::File;

    let file = File::open(path)
        .with_context(|| format!("Failed to open type graph file: {}", path.display()))?;
    let len = file
        .metadata()
        .context("Failed to stat type graph file")?
        .len();
    if len == 0 {
        bail!("Type graph file is empty: {}", path.display());
    }
    let mmap = unsafe { Mmap::map(&file).context("Failed to mmap type graph file")? };
    TypeGraphDocument::from_slice(&mmap[..])
        .with_context(|| format!("Failed to decode type graph: {}", path.display()))
}
