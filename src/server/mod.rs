//! Server Module
//!
//! The inbound half of the proxy: application state, route table, and the
//! permissive CORS surface the browser client depends on.

pub mod handlers;

use crate::config::ProxyConfig;
use crate::error::{ProxyError, Result};
use crate::rotation::{KeyPool, DEFAULT_MIN_SPACING_MS};
use crate::upstream::{ServiceKind, UpstreamClient};
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Shared state for one proxy instance.
///
/// Owns the key pools and upstream client for its whole lifetime; nothing
/// here is ambient or static, so independent instances (as in tests) do not
/// interfere with each other.
pub struct AppState {
    pools: HashMap<ServiceKind, KeyPool>,
    endpoints: HashMap<ServiceKind, String>,
    upstream: UpstreamClient,
}

impl AppState {
    /// Build state from configuration, creating one key pool per service
    pub fn from_config(config: &ProxyConfig) -> Result<Self> {
        let mut pools = HashMap::new();
        let mut endpoints = HashMap::new();

        for kind in ServiceKind::ALL {
            let service = config.services.get(kind.config_name()).ok_or_else(|| {
                ProxyError::Config(format!("missing configuration for service '{}'", kind))
            })?;

            let keys = service.get_api_keys();
            if keys.is_empty() {
                warn!(service = %kind, "no API keys configured, requests will be rejected");
            }

            let spacing = service.min_spacing_ms.unwrap_or(DEFAULT_MIN_SPACING_MS);
            pools.insert(
                kind,
                KeyPool::with_spacing(kind.display_name(), keys, spacing),
            );
            endpoints.insert(kind, service.endpoint.clone());
        }

        Ok(Self {
            pools,
            endpoints,
            upstream: UpstreamClient::new()?,
        })
    }

    /// Key pool for a service
    pub fn pool(&self, kind: ServiceKind) -> &KeyPool {
        &self.pools[&kind]
    }

    /// Upstream endpoint URL for a service
    pub fn endpoint(&self, kind: ServiceKind) -> &str {
        &self.endpoints[&kind]
    }

    /// The shared upstream HTTP client
    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }
}

/// Create the proxy router.
///
/// Every response, including synthetic errors and preflight, passes through
/// the CORS layer so the browser client on another origin can read it.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(86_400));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/:service", post(handlers::dispatch))
        .fallback(handlers::not_found)
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: ProxyConfig) -> Result<()> {
    let server = config.server();
    let state = Arc::new(AppState::from_config(&config)?);

    for kind in ServiceKind::ALL {
        info!(service = %kind, keys = state.pool(kind).len(), "key pool initialized");
    }

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ProxyError::Internal(format!("failed to bind {}: {}", addr, e)))?;
    info!(%addr, "listening");

    axum::serve(listener, build_router(state))
        .await
        .map_err(|e| ProxyError::Internal(format!("server error: {}", e)))
}
