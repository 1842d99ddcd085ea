//! The v1 API: tool invocation, tool listing, and context seeding.
//!
//! Endpoints:
//! - `POST /v1/tools/{name}`: invoke a tool with the raw request body as payload
//! - `GET  /v1/tools`: list registered tools
//! - `PUT  /v1/context/{key}`: insert or replace a context entry
//! - `GET  /v1/context`: ranked entries for a query (diagnostic)
//!
//! Failures are returned as `{"error": {"kind", "message", ...}}` with a
//! status derived from the error kind.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use persona_core::context::ContextEntry;
use persona_core::error::{MemoryError, ProviderError, ToolError};
use persona_core::tool::ToolResult;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{GatewayState, SharedState};

/// Build the v1 router (mounted under `/v1`).
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/tools", get(list_tools_handler))
        .route("/tools/{name}", post(invoke_tool_handler))
        .route("/context", get(context_query_handler))
        .route("/context/{key}", put(context_upsert_handler))
        .with_state(state)
}

// --- Errors ---

/// A dispatcher failure on its way to the transport.
#[derive(Debug)]
pub struct ApiError(pub ToolError);

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        Self(err)
    }
}

impl From<MemoryError> for ApiError {
    fn from(err: MemoryError) -> Self {
        Self(ToolError::Context(err))
    }
}

/// Status code for a dispatcher failure.
///
/// Cancellation maps to 499 (client closed request).
pub fn status_for(err: &ToolError) -> StatusCode {
    match err {
        ToolError::NotFound(_) => StatusCode::NOT_FOUND,
        ToolError::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
        ToolError::Provider(ProviderError::Validation(_)) => StatusCode::BAD_REQUEST,
        ToolError::Provider(ProviderError::Cancelled) => {
            StatusCode::from_u16(499).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
        }
        ToolError::Provider(_) => StatusCode::BAD_GATEWAY,
        ToolError::Context(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let mut detail = serde_json::json!({
            "kind": self.0.kind(),
            "message": self.0.to_string(),
        });
        match &self.0 {
            ToolError::NotFound(name) | ToolError::InvalidPayload { tool_name: name, .. } => {
                detail["tool"] = serde_json::json!(name);
            }
            ToolError::Provider(ProviderError::RemoteService { status_code, .. }) => {
                detail["upstream_status"] = serde_json::json!(status_code);
            }
            _ => {}
        }
        (status, Json(serde_json::json!({ "error": detail }))).into_response()
    }
}

// --- DTOs ---

#[derive(Serialize)]
struct ToolDto {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Serialize)]
struct ToolListResponse {
    tools: Vec<ToolDto>,
    count: usize,
}

#[derive(Deserialize)]
struct ContextUpsertRequest {
    text: String,
}

#[derive(Deserialize)]
struct ContextQueryParams {
    #[serde(default)]
    query: String,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct ContextQueryResponse {
    entries: Vec<ContextEntry>,
    count: usize,
    total: usize,
}

// --- Handlers ---

async fn invoke_tool_handler(
    State(state): State<SharedState>,
    Path(name): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let cancel = state.shutdown.child_token();

    info!(%request_id, tool = %name, "Tool invocation");
    let result = dispatch(&state, &name, body, &cancel)
        .await
        .inspect_err(|e| {
            warn!(
                %request_id,
                tool = %name,
                kind = e.kind(),
                error = %e,
                "Tool invocation failed"
            )
        })?;

    Ok(Json(result.output))
}

/// Hand the opaque request body to the registry.
///
/// An unknown tool wins over an unreadable body; a body that cannot be
/// buffered (e.g. over the size limit) or is not UTF-8 is an invalid payload.
async fn dispatch(
    state: &GatewayState,
    name: &str,
    body: Result<Bytes, BytesRejection>,
    cancel: &CancellationToken,
) -> Result<ToolResult, ToolError> {
    if state.registry.get(name).is_none() {
        return Err(ToolError::NotFound(name.to_string()));
    }

    let invalid = |reason: String| ToolError::InvalidPayload {
        tool_name: name.to_string(),
        reason,
    };
    let body = body.map_err(|rejection| invalid(rejection.body_text()))?;
    let text = std::str::from_utf8(&body)
        .map_err(|e| invalid(format!("payload is not UTF-8: {e}")))?;

    state.registry.invoke_raw(name, text, cancel).await
}

async fn list_tools_handler(State(state): State<SharedState>) -> Json<ToolListResponse> {
    let defs = state.registry.definitions();
    let count = defs.len();

    Json(ToolListResponse {
        tools: defs
            .into_iter()
            .map(|d| ToolDto {
                name: d.name,
                description: d.description,
                parameters: d.parameters,
            })
            .collect(),
        count,
    })
}

async fn context_upsert_handler(
    State(state): State<SharedState>,
    Path(key): Path<String>,
    Json(payload): Json<ContextUpsertRequest>,
) -> Result<StatusCode, ApiError> {
    state.store.upsert(&key, &payload.text).await?;
    info!(key = %key, "Context entry stored");
    Ok(StatusCode::NO_CONTENT)
}

async fn context_query_handler(
    State(state): State<SharedState>,
    Query(params): Query<ContextQueryParams>,
) -> Result<Json<ContextQueryResponse>, ApiError> {
    let limit = params.limit.unwrap_or(state.search_limit);
    let entries = state.store.rank(&params.query, limit).await?;
    let total = state.store.len().await?;

    Ok(Json(ContextQueryResponse {
        count: entries.len(),
        entries,
        total,
    }))
}
