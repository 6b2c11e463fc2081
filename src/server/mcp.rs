use crate::app::dto::*;
use crate::app::engine::OverrideEngine;
use rmcp::{
    Json, ServerHandler, ServiceExt, handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters, model::*, tool, tool_handler, tool_router,
    transport::stdio,
};
use tokio::task::spawn_blocking;

#[derive(Clone)]
pub struct OverrideMcpServer {
    engine: OverrideEngine,
    tool_router: ToolRouter<Self>,
}

impl OverrideMcpServer {
    pub fn new(engine: OverrideEngine) -> Self {
        Self {
            engine,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        let service = self.serve(stdio()).await?;
        service.waiting().await?;
        Ok(())
    }
}

#[tool_router]
impl OverrideMcpServer {
    #[tool(description = "List the virtual methods (slots) that a method overrides.")]
    async fn bases_of(
        &self,
        params: Parameters<MethodRequest>,
    ) -> Result<Json<RelationsResponse>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.bases(&req.method))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }

    #[tool(description = "List the methods that override a virtual method.")]
    async fn overrides_of(
        &self,
        params: Parameters<MethodRequest>,
    ) -> Result<Json<RelationsResponse>, String> {
        let engine = self.engine.clone();
        let req = params.0;
        spawn_blocking(move || engine.overrides(&req.method))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }

    #[tool(description = "Summarize the override map: edge counts by origin, slot roots, cycles.")]
    async fn override_stats(&self) -> Result<Json<StatsResponse>, String> {
        let engine = self.engine.clone();
        spawn_blocking(move || engine.stats())
            .await
            .map(Json)
            .map_err(|e| format!("task join error: {e}"))
    }

    #[tool(description = "Search methods by regex over ids and names.")]
    async fn search_methods(
        &self,
        params: Parameters<SearchRequest>,
    ) -> Result<Json<SearchResponse>, String> {
        let engine = self.engine.clone();
        let p = params.0;
        spawn_blocking(move || engine.search(&p.pattern, p.limit))
            .await
            .map_err(|e| format!("task join error: {e}"))?
            .map(Json)
            .map_err(|e| format!("{e:#}"))
    }
}

#[tool_handler]
impl ServerHandler for OverrideMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Query virtual-method override relationships of a loaded type graph.".into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
