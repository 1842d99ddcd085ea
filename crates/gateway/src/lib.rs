//! HTTP gateway for persona-relay.
//!
//! Exposes the tool registry and the context store over REST, plus
//! liveness routes. Built on Axum.

pub mod api_v1;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, extract::State, response::Json, routing::get};
use persona_config::AppConfig;
use persona_core::context::ContextStore;
use persona_core::tool::ToolRegistry;
use persona_memory::InMemoryContextStore;
use persona_providers::GenerationClient;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Greeting served on `GET /`.
pub const GREETING: &str = "Hello World! This is a Model Context Protocol server.";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub registry: Arc<ToolRegistry>,
    pub store: Arc<dyn ContextStore>,
    /// Default `limit` for context queries that omit one.
    pub search_limit: usize,
    /// Root token; every request works under a child of it.
    pub shutdown: CancellationToken,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl GatewayState {
    pub fn new(registry: ToolRegistry, store: Arc<dyn ContextStore>, search_limit: usize) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            search_limit,
            shutdown: CancellationToken::new(),
            started_at: chrono::Utc::now(),
        }
    }
}

pub type SharedState = Arc<GatewayState>;

/// Build the full router: liveness routes plus the v1 API.
///
/// Layers applied:
/// - CORS restricted to `allowed_origins`, credentials allowed
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors_layer(allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS policy for the configured origins. Unparsable origins are skipped.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Wire the store, generation client, and registry from config.
///
/// Fails if the configured generation backend cannot be built.
pub async fn build_state(config: &AppConfig) -> Result<SharedState, Box<dyn std::error::Error>> {
    let provider = persona_providers::build_from_config(config)?;
    let client = GenerationClient::new(provider);

    let store: Arc<dyn ContextStore> = Arc::new(InMemoryContextStore::new());
    for seed in &config.context.seed {
        store.upsert(&seed.key, &seed.text).await?;
    }
    if !config.context.seed.is_empty() {
        info!(entries = config.context.seed.len(), "Seeded context store");
    }

    let registry =
        persona_tools::default_registry(store.clone(), client, config.context.search_limit);

    Ok(Arc::new(GatewayState::new(
        registry,
        store,
        config.context.search_limit,
    )))
}

/// Start the gateway HTTP server.
///
/// Ctrl-C cancels the root token (aborting in-flight generation) and
/// shuts the server down gracefully.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = build_state(&config).await?;
    let shutdown = state.shutdown.clone();
    let app = build_router(state, &config.gateway.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    info!("Shutdown requested");
    shutdown.cancel();
}

// --- Handlers ---

async fn root_handler() -> &'static str {
    GREETING
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: i64,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: (chrono::Utc::now() - state.started_at).num_seconds(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use persona_config::{ContextSeed, GenerationBackend};
    use tower::ServiceExt;

    fn mock_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.generation.backend = GenerationBackend::Mock;
        config
    }

    async fn test_router() -> Router {
        let config = mock_config();
        let state = build_state(&config).await.unwrap();
        build_router(state, &config.gateway.allowed_origins)
    }

    #[tokio::test]
    async fn root_returns_greeting() {
        let app = test_router().await;

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], GREETING.as_bytes());
    }

    #[tokio::test]
    async fn health_check() {
        let app = test_router().await;

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn v1_routes_are_nested() {
        let app = test_router().await;

        let req = Request::builder().uri("/v1/tools").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn oversized_payload_is_structured_invalid_payload() {
        let app = test_router().await;

        let req = Request::builder()
            .method("POST")
            .uri("/v1/tools/echo")
            .body(Body::from(vec![b' '; 1024 * 1024 + 1]))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["kind"], "invalid_payload");
        assert_eq!(json["error"]["tool"], "echo");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin_with_credentials() {
        let app = test_router().await;

        let req = Request::builder()
            .uri("/health")
            .header("Origin", "https://staging.botdigital.info")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get("access-control-allow-origin").unwrap(),
            "https://staging.botdigital.info"
        );
        assert_eq!(headers.get("access-control-allow-credentials").unwrap(), "true");
    }

    #[tokio::test]
    async fn cors_rejects_unlisted_origin() {
        let app = test_router().await;

        let req = Request::builder()
            .uri("/health")
            .header("Origin", "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert!(response.headers().get("access-control-allow-origin").is_none());
    }

    #[tokio::test]
    async fn build_state_seeds_context() {
        let mut config = mock_config();
        config.context.seed = vec![
            ContextSeed {
                key: "greeting".into(),
                text: "Hello, visitor".into(),
            },
            ContextSeed {
                key: "hours".into(),
                text: "Open 9-5".into(),
            },
        ];

        let state = build_state(&config).await.unwrap();
        assert_eq!(state.store.len().await.unwrap(), 2);
        assert_eq!(state.registry.names(), vec!["echo", "personaAnalysis"]);
    }

    #[tokio::test]
    async fn build_state_fails_without_azure_settings() {
        let config = AppConfig::default();
        assert!(build_state(&config).await.is_err());
    }
}
