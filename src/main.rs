use anyhow::Result;
use override_map::cli::{self, Cli, Command};
use override_map::app::engine::OverrideEngine;
use override_map::server::{http, mcp::OverrideMcpServer};
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout belongs to command output and the MCP transport
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let engine = OverrideEngine::load_from_json(&cli.graph, cli.engine_config())?;

    match cli.command {
        Command::Stats => cli::display_stats(&engine)?,
        Command::Bases { method } => cli::display_bases(&engine, &method)?,
        Command::Overrides { method } => cli::display_overrides(&engine, &method)?,
        Command::Search { pattern, limit } => cli::search_methods(&engine, &pattern, limit)?,
        Command::Dump { json } => cli::dump_edges(&engine, json)?,
        Command::Serve { port } => {
            let addr = SocketAddr::from(([127, 0, 0, 1], port));
            http::serve(engine, addr).await?;
        }
        Command::Mcp => OverrideMcpServer::new(engine).serve_stdio().await?,
    }

    Ok(())
}
