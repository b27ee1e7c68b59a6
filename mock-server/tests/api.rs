use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use dnsview_core::HttpMethod;
use dnsview_mock::{app, MockCall, Registry, SharedRegistry};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> axum::body::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn registry() -> SharedRegistry {
    Arc::new(Registry::new())
}

// --- matching ---

#[tokio::test]
async fn registered_call_is_answered() {
    let registry = registry();
    registry
        .register(MockCall::new(HttpMethod::Get, "zones/example.com").response_json(&json!({"id": "z1"})))
        .unwrap();

    let resp = app(registry).oneshot(get("/v1/zones/example.com")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
    assert_eq!(body_json(resp).await, json!({"id": "z1"}));
}

#[tokio::test]
async fn response_headers_and_status_are_copied() {
    let registry = registry();
    registry
        .register(
            MockCall::new(HttpMethod::Delete, "views/internal")
                .status(204)
                .response_header("X-Request-Id", "abc")
                .response_header("x-request-id", "def"),
        )
        .unwrap();

    let resp = app(registry)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/v1/views/internal")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let ids: Vec<_> = resp.headers().get_all("x-request-id").iter().collect();
    assert_eq!(ids, ["abc", "def"]);
    assert!(resp.headers().get(http::header::CONTENT_TYPE).is_none());
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn registered_content_type_is_kept() {
    let registry = registry();
    registry
        .register(
            MockCall::new(HttpMethod::Get, "views")
                .response_header("content-type", "application/vnd.views+json")
                .response_json(&json!([])),
        )
        .unwrap();

    let resp = app(registry).oneshot(get("/v1/views")).await.unwrap();
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "application/vnd.views+json"
    );
}

#[tokio::test]
async fn structured_request_body_matches_after_remarshaling() {
    let registry = registry();
    registry
        .register(
            MockCall::new(HttpMethod::Post, "config/views/preference")
                .request_json(&json!({"internal": 1}))
                .response_json(&json!({"internal": 1})),
        )
        .unwrap();

    let resp = app(Arc::clone(&registry))
        .oneshot(json_request("POST", "/v1/config/views/preference", r#"{"internal":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app(Arc::clone(&registry))
        .oneshot(json_request("POST", "/v1/config/views/preference", "{\"internal\": 1}\n"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app(registry)
        .oneshot(json_request("POST", "/v1/config/views/preference", r#"{"internal":2}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn literal_request_body_must_match_bytes() {
    let registry = registry();
    registry
        .register(MockCall::new(HttpMethod::Post, "views/internal").request_body(r#"{"name":"internal"}"#))
        .unwrap();

    let resp = app(Arc::clone(&registry))
        .oneshot(json_request("POST", "/v1/views/internal", r#"{"name":"internal"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app(registry)
        .oneshot(json_request("POST", "/v1/views/internal", "{\"name\": \"internal\"}\n"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn expected_headers_must_be_present() {
    let registry = registry();
    registry
        .register(
            MockCall::new(HttpMethod::Get, "views")
                .request_header("X-NSONE-Key", "secret")
                .response_body("ok"),
        )
        .unwrap();

    let resp = app(Arc::clone(&registry)).oneshot(get("/v1/views")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);

    let resp = app(registry)
        .oneshot(
            Request::builder()
                .uri("/v1/views")
                .header("x-nsone-key", "secret")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_bytes(resp).await, "ok");
}

#[tokio::test]
async fn query_string_order_matters() {
    let registry = registry();
    registry
        .register(MockCall::new(HttpMethod::Get, "zones/x").param("k1", "a").param("k2", "b"))
        .unwrap();

    let resp = app(Arc::clone(&registry)).oneshot(get("/v1/zones/x?k1=a&k2=b")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app(registry).oneshot(get("/v1/zones/x?k2=b&k1=a")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
}

// --- failures ---

#[tokio::test]
async fn unmatched_call_returns_diagnostic() {
    let resp = app(registry()).oneshot(get("/v1/views/ghost")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
    let body = body_json(resp).await;
    assert!(body["message"].as_str().unwrap().contains("GET /v1/views/ghost"));
}

#[tokio::test]
async fn cleared_registry_answers_nothing() {
    let registry = registry();
    registry.register(MockCall::new(HttpMethod::Get, "views")).unwrap();
    registry.clear();

    let resp = app(registry).oneshot(get("/v1/views")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn unsupported_method_returns_405() {
    let resp = app(registry())
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/v1/views")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn malformed_incoming_uri_returns_400() {
    let resp = app(registry()).oneshot(get("/v1/views/bad%zz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_registered_status_returns_500() {
    let registry = registry();
    registry.register(MockCall::new(HttpMethod::Get, "views").status(42)).unwrap();

    let resp = app(registry).oneshot(get("/v1/views")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
