//! End-to-end dispatch tests against the full router, with upstreams
//! simulated by mockito or pointed at unreachable addresses.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use studybuddy_proxy::{build_router, AppState, ProxyConfig, ServiceConfig};
use tower::ServiceExt;

fn service(endpoint: &str, keys: &[&str]) -> ServiceConfig {
    ServiceConfig {
        endpoint: endpoint.to_string(),
        api_key_env: None,
        api_keys_env: None,
        keys: keys.iter().map(|k| k.to_string()).collect(),
        min_spacing_ms: None,
    }
}

/// Config with explicit endpoints and raw keys, no env lookups
fn test_config(
    groq: (&str, &[&str]),
    gemini: (&str, &[&str]),
    search: (&str, &[&str]),
) -> ProxyConfig {
    let mut services = HashMap::new();
    services.insert("groq".to_string(), service(groq.0, groq.1));
    services.insert("gemini".to_string(), service(gemini.0, gemini.1));
    services.insert("search".to_string(), service(search.0, search.1));
    ProxyConfig {
        server: None,
        services,
    }
}

fn router_for(config: ProxyConfig) -> axum::Router {
    let state = Arc::new(AppState::from_config(&config).expect("state builds"));
    build_router(state)
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "https://studybuddy.example")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn unknown_service_returns_404_with_cors() {
    let app = router_for(test_config(
        ("http://127.0.0.1:9/groq", &["k"]),
        ("http://127.0.0.1:9/gemini", &["k"]),
        ("http://127.0.0.1:9/search", &["k"]),
    ));

    let response = app
        .oneshot(post_json("/unknown", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(
        response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        "CORS headers must be present on error responses"
    );

    let body = body_json(response).await;
    assert_eq!(body["error"], "Unknown service: unknown");
}

#[tokio::test]
async fn empty_search_pool_returns_429() {
    let app = router_for(test_config(
        ("http://127.0.0.1:9/groq", &["k"]),
        ("http://127.0.0.1:9/gemini", &["k"]),
        ("http://127.0.0.1:9/search", &[]),
    ));

    let response = app
        .oneshot(post_json("/search", json!({ "query": "mitosis" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let body = body_json(response).await;
    assert_eq!(body["error"], "No Tavily API keys available");
}

#[tokio::test]
async fn upstream_connection_failure_returns_500_json() {
    // Nothing listens on port 9; the connect fails at the transport level
    let app = router_for(test_config(
        ("http://127.0.0.1:9/v1/chat/completions", &["k"]),
        ("http://127.0.0.1:9/gemini", &["k"]),
        ("http://127.0.0.1:9/search", &["k"]),
    ));

    let response = app
        .oneshot(post_json("/groq", json!({ "messages": [] })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Error calling Groq API");
}

#[tokio::test]
async fn successful_dispatch_relays_upstream_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer groq-key-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"content":"42"}}]}"#)
        .create_async()
        .await;

    let endpoint = format!("{}/v1/chat/completions", server.url());
    let app = router_for(test_config(
        (&endpoint, &["groq-key-1"]),
        ("http://127.0.0.1:9/gemini", &["k"]),
        ("http://127.0.0.1:9/search", &["k"]),
    ));

    let response = app
        .oneshot(post_json(
            "/groq",
            json!({ "messages": [{ "role": "user", "content": "meaning of life?" }] }),
        ))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["choices"][0]["message"]["content"], "42");
}

#[tokio::test]
async fn upstream_rejection_is_relayed_verbatim() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"model not found"}}"#)
        .create_async()
        .await;

    let endpoint = format!("{}/v1/chat/completions", server.url());
    let app = router_for(test_config(
        (&endpoint, &["k"]),
        ("http://127.0.0.1:9/gemini", &["k"]),
        ("http://127.0.0.1:9/search", &["k"]),
    ));

    let response = app
        .oneshot(post_json("/groq", json!({ "model": "nope" })))
        .await
        .unwrap();

    // The provider's own status and body pass through untouched
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "model not found");
}

#[tokio::test]
async fn consecutive_dispatches_rotate_keys() {
    let mut server = mockito::Server::new_async().await;
    let first = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer key-a")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer key-b")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("{}")
        .expect(1)
        .create_async()
        .await;

    let endpoint = format!("{}/v1/chat/completions", server.url());
    let app = router_for(test_config(
        (&endpoint, &["key-a", "key-b"]),
        ("http://127.0.0.1:9/gemini", &["k"]),
        ("http://127.0.0.1:9/search", &["k"]),
    ));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/groq", json!({ "messages": [] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn preflight_short_circuits_with_cors_headers() {
    let app = router_for(test_config(
        ("http://127.0.0.1:9/groq", &["k"]),
        ("http://127.0.0.1:9/gemini", &["k"]),
        ("http://127.0.0.1:9/search", &["k"]),
    ));

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/groq")
        .header(header::ORIGIN, "https://studybuddy.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_MAX_AGE)
            .and_then(|v| v.to_str().ok()),
        Some("86400")
    );
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn health_reports_pool_sizes() {
    let app = router_for(test_config(
        ("http://127.0.0.1:9/groq", &["a", "b"]),
        ("http://127.0.0.1:9/gemini", &["c"]),
        ("http://127.0.0.1:9/search", &[]),
    ));

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["services"]["groq"]["keys"], 2);
    assert_eq!(body["services"]["gemini"]["keys"], 1);
    assert_eq!(body["services"]["search"]["keys"], 0);
}
