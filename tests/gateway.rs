//! End-to-end tests: built-in plugins mounted against a mock search cluster
//! and exercised through the composed HTTP application.

mod common;

use std::sync::Arc;

use arc_gateway::plugins::register_builtin;
use arc_gateway::{bootstrap, GatewayConfig, HttpServer, OrderPolicy, Registry};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{body_text, start_mock_cluster, SharedCluster};

struct Harness {
    app: axum::Router,
    cluster: SharedCluster,
    mount_order: Vec<String>,
}

async fn start_gateway() -> Harness {
    let (addr, cluster) = start_mock_cluster().await;

    let mut config = GatewayConfig::default();
    config.search.url = format!("http://{}", addr);

    let mut registry = Registry::new();
    register_builtin(&mut registry, &config).unwrap();
    let gateway = bootstrap(registry, &OrderPolicy::catch_all_last(config.plugins.catch_all.clone()))
        .await
        .unwrap();

    let server = HttpServer::new(config, gateway.router());
    Harness {
        app: server.app(),
        cluster,
        mount_order: gateway.mount_order().to_vec(),
    }
}

async fn send(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    (status, body_text(response).await)
}

#[tokio::test]
async fn test_builtin_plugins_mount_with_catch_all_last() {
    let harness = start_gateway().await;
    assert_eq!(harness.mount_order, vec!["auth", "permissions", "users", "es"]);

    let cluster = harness.cluster.lock().unwrap();
    assert!(cluster.indices.contains_key(".users"));
    assert!(cluster.indices.contains_key(".permissions"));
}

#[tokio::test]
async fn test_health_is_served_by_auth_not_proxied() {
    let harness = start_gateway().await;

    let (status, body) = send(&harness.app, Method::GET, "/_health", None).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unclaimed_paths_are_proxied() {
    let harness = start_gateway().await;

    let (status, body) = send(&harness.app, Method::GET, "/twitter/_search?q=user:kimchy", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "mock GET /twitter/_search?q=user:kimchy");

    let (_, body) = send(&harness.app, Method::POST, "/twitter/_doc", Some(json!({"a": 1}))).await;
    assert_eq!(body, "mock POST /twitter/_doc");
}

#[tokio::test]
async fn test_user_lifecycle() {
    let harness = start_gateway().await;
    let app = &harness.app;

    let (status, _) = send(
        app,
        Method::PUT,
        "/_user/alice",
        Some(json!({ "password": "s3cr:et", "email": "alice@example.com", "op": "read" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::GET, "/_user/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    let user: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(user["user_id"], "alice");
    assert_eq!(user["email"], "alice@example.com");
    assert!(user.get("password").is_none());

    let (status, _) = send(app, Method::PATCH, "/_user/alice", Some(json!({ "op": "write" }))).await;
    assert_eq!(status, StatusCode::OK);
    {
        let cluster = harness.cluster.lock().unwrap();
        assert_eq!(cluster.indices[".users"]["alice"]["op"], "write");
    }

    let (status, _) = send(app, Method::PATCH, "/_user/alice", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app, Method::DELETE, "/_user/alice", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, Method::GET, "/_user/alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_basic_auth_against_users_index() {
    let harness = start_gateway().await;
    let app = &harness.app;

    send(
        app,
        Method::PUT,
        "/_user/alice",
        Some(json!({ "password": "s3cr:et", "email": "alice@example.com" })),
    )
    .await;

    let authed = |credentials: &'static str| {
        Request::builder()
            .uri("/_auth")
            .header(header::AUTHORIZATION, format!("Basic {}", credentials))
            .body(Body::empty())
            .unwrap()
    };

    // alice:s3cr:et
    let response = app.clone().oneshot(authed("YWxpY2U6czNjcjpldA==")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let user: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(user["user_id"], "alice");
    assert!(user.get("password").is_none());

    // alice:wrong
    let response = app.clone().oneshot(authed("YWxpY2U6d3Jvbmc=")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

    let (status, _) = send(app, Method::GET, "/_auth", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_permission_records_use_their_own_index() {
    let harness = start_gateway().await;
    let app = &harness.app;

    let (status, _) = send(
        app,
        Method::PUT,
        "/_permission/bob",
        Some(json!({ "password": "pw", "creator": "alice", "acl": ["search"], "indices": ["twitter"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let cluster = harness.cluster.lock().unwrap();
    let stored = &cluster.indices[".permissions"]["bob"];
    assert_eq!(stored["username"], "bob");
    assert_eq!(stored["creator"], "alice");
    assert!(!cluster.indices[".users"].contains_key("bob"));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let harness = start_gateway().await;

    let response = harness
        .app
        .clone()
        .oneshot(Request::builder().uri("/_health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers().get("x-request-id").unwrap();
    assert!(!generated.is_empty());

    let response = harness
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/_health")
                .header("x-request-id", "trace-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers().get("x-request-id").unwrap(), "trace-42");
}

#[tokio::test]
async fn test_concurrent_requests_share_router() {
    let harness = start_gateway().await;
    let router = Arc::new(harness.app);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let app = router.clone();
        handles.push(tokio::spawn(async move {
            send(&app, Method::GET, "/_health", None).await.0
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
}
