//! HTTP request handlers for the proxy.

use crate::error::ProxyError;
use crate::rotation::KeyPoolStats;
use crate::server::AppState;
use crate::upstream::ServiceKind;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Dispatch one inbound request to its upstream service.
///
/// Looks up the service by path segment, acquires a key from the rotation
/// pool (selection and usage accounting happen as one atomic step), forwards
/// the body, and relays whatever the upstream returned.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Path(service): Path<String>,
    Json(body): Json<Value>,
) -> Result<Response, ProxyError> {
    let kind =
        ServiceKind::from_path(&service).ok_or(ProxyError::UnknownService(service))?;

    let key = state
        .pool(kind)
        .acquire()
        .ok_or_else(|| ProxyError::NoKeysAvailable(kind.display_name().to_string()))?;

    debug!(service = %kind, "dispatching to upstream");

    let (status, payload) = state
        .upstream()
        .forward(kind, state.endpoint(kind), &key, &body)
        .await?;

    info!(service = %kind, status = status.as_u16(), "relayed upstream response");

    Ok((status, Json(payload)).into_response())
}

/// Health payload for one service pool
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    /// Number of keys configured
    pub keys: usize,
    /// Dispatch attempts since process start
    pub requests: u64,
}

impl From<KeyPoolStats> for ServiceHealth {
    fn from(stats: KeyPoolStats) -> Self {
        Self {
            keys: stats.total_keys,
            requests: stats.total_requests,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Crate version
    pub version: String,
    /// Per-service pool statistics
    pub services: HashMap<String, ServiceHealth>,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let services = ServiceKind::ALL
        .iter()
        .map(|&kind| {
            (
                kind.config_name().to_string(),
                ServiceHealth::from(state.pool(kind).stats()),
            )
        })
        .collect();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}

/// Fallback for paths outside the service surface
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Not found" })),
    )
        .into_response()
}
