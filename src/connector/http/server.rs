use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use super::dto::{
    BackendsResponse, ErrorBody, InvokeMetadata, InvokeRequest, InvokeResponse, QueryRequest,
    QueryResponse,
};
use super::error::ApiError;
use crate::connector::api::Container;
use crate::domain::{DomainError, GenerationOptions, Targets};

#[derive(Clone)]
pub struct AppState {
    container: Arc<Container>,
}

impl AppState {
    pub fn new(container: Arc<Container>) -> Self {
        Self { container }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/backends", get(list_backends))
        .route("/query", post(query))
        .route("/{backend}/invoke", post(invoke))
        .with_state(state)
}

/// Serves until `shutdown` is cancelled. In-flight backend calls of a request
/// are dropped when its client disconnects.
pub async fn serve(
    container: Arc<Container>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, create_router(AppState::new(container)))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            info!("Shutting down HTTP server...");
        })
        .await?;

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn list_backends(State(state): State<AppState>) -> Json<BackendsResponse> {
    let backends = state.container.list_backends_use_case().execute();
    Json(BackendsResponse { backends })
}

async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4();
    let span = info_span!("query", %request_id, target = %request.target);

    async move {
        let targets: Targets = request.target.parse()?;

        let mut use_case = state.container.route_use_case();
        if let Some(temperature) = request.temperature {
            use_case = use_case.with_options(GenerationOptions::new().with_temperature(temperature));
        }

        let results = use_case.execute(&request.query, &targets).await?;
        Ok::<_, ApiError>(Json(QueryResponse { results }))
    }
    .instrument(span)
    .await
}

/// LangServe-style route. `backend` is matched ignoring case, so
/// `/OpenAI/invoke` reaches the `openai` backend.
async fn invoke(
    State(state): State<AppState>,
    Path(backend): Path<String>,
    payload: Result<Json<InvokeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let request_id = Uuid::new_v4();
    let span = info_span!("invoke", %request_id, %backend);

    async move {
        let registry = state.container.registry();
        let name = registry.resolve_name(&backend)?.to_string();

        let results = state
            .container
            .invoke_use_case()
            .execute_with_variables(&request.variables(), &Targets::single(name))
            .await?;

        let Some(result) = results.into_iter().next() else {
            return Err(ApiError(DomainError::internal(
                "router returned no result",
            )));
        };

        if !result.succeeded() {
            let body = ErrorBody {
                error: result.error_message().unwrap_or("backend failed").to_string(),
                code: StatusCode::BAD_GATEWAY.as_u16(),
            };
            return Ok((StatusCode::BAD_GATEWAY, Json(body)).into_response());
        }

        Ok::<_, ApiError>(Json(InvokeResponse {
            output: result.text().to_string(),
            metadata: InvokeMetadata {
                backend_name: result.backend_name().to_string(),
                latency_ms: result.latency_ms(),
            },
        })
        .into_response())
    }
    .instrument(span)
    .await
}
