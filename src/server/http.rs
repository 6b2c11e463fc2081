use crate::app::engine::{MethodNotFound, OverrideEngine};
use anyhow::Result;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::spawn_blocking;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

#[derive(Clone)]
pub struct HttpState {
    pub engine: OverrideEngine,
}

#[derive(Debug, Clone, Deserialize)]
struct MethodQuery {
    method: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SearchQuery {
    pattern: String,
    limit: Option<usize>,
}

#[derive(Debug, Clone, serde::Serialize)]
struct ApiErrorBody {
    error: String,
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> impl IntoResponse {
    (status, Json(ApiErrorBody { error: msg.into() }))
}

/// Unknown methods are 404, anything else about the query (bad id, bad regex) is 400.
fn query_error(e: anyhow::Error) -> axum::response::Response {
    let status = if e.downcast_ref::<MethodNotFound>().is_some() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_REQUEST
    };
    api_error(status, format!("{e:#}")).into_response()
}

fn join_error(e: tokio::task::JoinError) -> axum::response::Response {
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("task join error: {e}"),
    )
    .into_response()
}

pub fn build_router(engine: OverrideEngine) -> Router {
    let state = Arc::new(HttpState { engine });

    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/bases", get(bases))
        .route("/overrides", get(overrides))
        .route("/search", get(search))
        .route("/reload", post(reload))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(engine: OverrideEngine, addr: SocketAddr) -> Result<()> {
    let app = build_router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(state.engine.health())
}

async fn reload(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.reload()).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => {
            api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")).into_response()
        }
        Err(e) => join_error(e),
    }
}

async fn stats(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.stats()).await {
        Ok(res) => Json(res).into_response(),
        Err(e) => join_error(e),
    }
}

async fn bases(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<MethodQuery>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.bases(&q.method)).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => query_error(e),
        Err(e) => join_error(e),
    }
}

async fn overrides(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<MethodQuery>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.overrides(&q.method)).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => query_error(e),
        Err(e) => join_error(e),
    }
}

async fn search(
    State(state): State<Arc<HttpState>>,
    Query(q): Query<SearchQuery>,
) -> impl IntoResponse {
    let engine = state.engine.clone();
    match spawn_blocking(move || engine.search(&q.pattern, q.limit)).await {
        Ok(Ok(res)) => Json(res).into_response(),
        Ok(Err(e)) => query_error(e),
        Err(e) => join_error(e),
    }
}
