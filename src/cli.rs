use crate::app::dto::RelationsResponse;
use crate::app::engine::{EngineConfig, OverrideEngine};
use crate::domain::resolver::ResolveOptions;
use crate::domain::type_ref::MatchOptions;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ovmap: resolve virtual-method override relationships in a type graph
#[derive(Parser, Debug)]
#[command(name = "ovmap")]
#[command(about = "Map every virtual method to the slots it overrides", long_about = None)]
pub struct Cli {
    /// Type graph JSON file
    pub graph: PathBuf,

    /// Resolve types one after another instead of on the rayon pool
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Compare only the element of array/pointer/by-ref specs, not their kind
    #[arg(long, default_value_t = false)]
    pub element_only_specs: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Edge counts by origin, slot roots and hierarchy cycles
    Stats,
    /// Slots that METHOD overrides
    Bases { method: String },
    /// Methods that override METHOD
    Overrides { method: String },
    /// Regex search over method ids and names
    Search {
        pattern: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print every recorded edge
    Dump {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Serve the override map over HTTP
    Serve {
        #[arg(long, default_value_t = 7878)]
        port: u16,
    },
    /// Serve the override map as an MCP stdio server
    Mcp,
}

impl Cli {
    /// Parse CLI arguments from the environment
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub fn engine_config(&self) -> EngineConfig {
        let match_options = if self.element_only_specs {
            MatchOptions::element_only_specs()
        } else {
            MatchOptions::default()
        };
        EngineConfig {
            resolve: ResolveOptions {
                match_options,
                parallel: !self.sequential,
            },
        }
    }
}

pub fn display_stats(engine: &OverrideEngine) -> Result<()> {
    let stats = engine.stats();

    println!("{}", "=".repeat(60));
    println!("Override Map");
    println!("{}", "=".repeat(60));
    println!("  Types: {}", stats.type_count);
    println!(
        "  Methods: {} ({} virtual)",
        stats.method_count, stats.virtual_method_count
    );
    println!("  Edges: {}", stats.edge_count);
    println!("    class hierarchy: {}", stats.class_hierarchy_edges);
    println!("    interface:       {}", stats.interface_edges);
    println!("    explicit:        {}", stats.explicit_edges);
    println!("  Slot roots: {}", stats.slot_roots);

    println!("\nUnits:");
    for unit in &stats.units {
        println!(
            "  {} - {} types, {} virtual methods, {} edges{}",
            unit.name,
            unit.types_visited,
            unit.virtual_methods_visited,
            unit.edges_added,
            if unit.cancelled { " (cancelled)" } else { "" }
        );
    }

    if !stats.interface_cycles.is_empty() || !stats.base_cycles.is_empty() {
        println!("\nCyclic declarations:");
        for cycle in &stats.interface_cycles {
            println!("  interface: {}", cycle.join(" -> "));
        }
        for cycle in &stats.base_cycles {
            println!("  base: {}", cycle.join(" -> "));
        }
    }
    Ok(())
}

pub fn display_bases(engine: &OverrideEngine, method: &str) -> Result<()> {
    let res = engine.bases(method)?;
    print_relations("overrides", &res);
    Ok(())
}

pub fn display_overrides(engine: &OverrideEngine, method: &str) -> Result<()> {
    let res = engine.overrides(method)?;
    print_relations("is overridden by", &res);
    Ok(())
}

fn print_relations(verb: &str, res: &RelationsResponse) {
    println!("{} [{}]", res.method.signature, res.method.id);
    if res.related.is_empty() {
        println!("  {} nothing", verb);
        return;
    }
    println!("  {}:", verb);
    for related in &res.related {
        println!(
            "    {} [{}] via {}",
            related.method.signature, related.method.id, related.origin
        );
    }
}

pub fn search_methods(engine: &OverrideEngine, pattern: &str, limit: Option<usize>) -> Result<()> {
    let res = engine.search(pattern, limit)?;

    println!("Searching for methods matching: \"{}\"", pattern);
    println!("{}", "=".repeat(80));
    println!(
        "Found {} matching methods (showing {})\n",
        res.total_matches,
        res.items.len()
    );
    for (i, item) in res.items.iter().enumerate() {
        println!(
            "{}. {} [{}]{}",
            i + 1,
            item.method.signature,
            item.method.id,
            if item.method.is_virtual { " virtual" } else { "" }
        );
        println!(
            "   {} bases, {} overrides",
            item.base_count, item.override_count
        );
    }
    Ok(())
}

pub fn dump_edges(engine: &OverrideEngine, json: bool) -> Result<()> {
    let res = engine.edges();
    if json {
        println!("{}", serde_json::to_string_pretty(&res)?);
        return Ok(());
    }
    for edge in &res.edges {
        println!("{} <- {} ({})", edge.base, edge.overriding, edge.origin);
    }
    Ok(())
}
