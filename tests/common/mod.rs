//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use arc_gateway::plugin::{BoxError, PluginUnit};
use arc_gateway::routing::{PathParams, Route};
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Method, Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, head, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Serve `app` on an ephemeral local port.
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A local port with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// In-memory state of the mock search cluster.
#[derive(Default)]
pub struct MockCluster {
    /// index name → document id → source
    pub indices: HashMap<String, HashMap<String, Value>>,
}

pub type SharedCluster = Arc<Mutex<MockCluster>>;

/// Start a mock search cluster speaking the subset of the REST API the
/// gateway uses. Unknown paths echo `"mock <METHOD> <URI>"`.
pub async fn start_mock_cluster() -> (SocketAddr, SharedCluster) {
    let cluster: SharedCluster = Arc::default();

    let app = Router::new()
        .route("/", get(|| async { Json(json!({ "cluster_name": "mock" })) }))
        .route("/{index}", head(index_exists).put(create_index))
        .route(
            "/{index}/_doc/{id}",
            get(get_doc).put(put_doc).delete(delete_doc),
        )
        .route("/{index}/_update/{id}", post(update_doc))
        .fallback(echo)
        .with_state(cluster.clone());

    (spawn_app(app).await, cluster)
}

async fn index_exists(State(c): State<SharedCluster>, Path(index): Path<String>) -> StatusCode {
    if c.lock().unwrap().indices.contains_key(&index) {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn create_index(State(c): State<SharedCluster>, Path(index): Path<String>) -> Json<Value> {
    c.lock().unwrap().indices.entry(index.clone()).or_default();
    Json(json!({ "acknowledged": true, "index": index }))
}

async fn get_doc(
    State(c): State<SharedCluster>,
    Path((index, id)): Path<(String, String)>,
) -> Response {
    let cluster = c.lock().unwrap();
    match cluster.indices.get(&index).and_then(|docs| docs.get(&id)) {
        Some(source) => Json(json!({ "_id": id, "found": true, "_source": source })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "_id": id, "found": false }))).into_response(),
    }
}

async fn put_doc(
    State(c): State<SharedCluster>,
    Path((index, id)): Path<(String, String)>,
    Json(source): Json<Value>,
) -> Json<Value> {
    c.lock()
        .unwrap()
        .indices
        .entry(index)
        .or_default()
        .insert(id.clone(), source);
    Json(json!({ "_id": id, "result": "created" }))
}

async fn update_doc(
    State(c): State<SharedCluster>,
    Path((index, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let mut cluster = c.lock().unwrap();
    let Some(doc) = cluster.indices.get_mut(&index).and_then(|docs| docs.get_mut(&id)) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "found": false }))).into_response();
    };
    if let (Some(target), Some(fields)) = (doc.as_object_mut(), body["doc"].as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(json!({ "_id": id, "result": "updated" })).into_response()
}

async fn delete_doc(
    State(c): State<SharedCluster>,
    Path((index, id)): Path<(String, String)>,
) -> Response {
    let removed = c
        .lock()
        .unwrap()
        .indices
        .get_mut(&index)
        .and_then(|docs| docs.remove(&id));
    match removed {
        Some(_) => Json(json!({ "_id": id, "result": "deleted" })).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "result": "not_found" }))).into_response(),
    }
}

async fn echo(method: Method, uri: Uri) -> String {
    format!("mock {} {}", method, uri)
}

/// Plugin whose handlers answer with `"<plugin> <pattern>"`.
pub struct StubPlugin {
    name: String,
    routes: Vec<(Method, String)>,
    failure: Option<String>,
}

impl StubPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            routes: Vec::new(),
            failure: None,
        }
    }

    pub fn route(mut self, method: Method, pattern: &str) -> Self {
        self.routes.push((method, pattern.to_string()));
        self
    }

    pub fn failing(mut self, cause: &str) -> Self {
        self.failure = Some(cause.to_string());
        self
    }
}

#[async_trait]
impl PluginUnit for StubPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn routes(&self) -> Vec<Route> {
        self.routes
            .iter()
            .map(|(method, pattern)| {
                let body = format!("{} {}", self.name, pattern);
                Route::new(
                    method.clone(),
                    pattern.as_str(),
                    move |_req: Request<Body>, _params: PathParams| {
                        let body = body.clone();
                        async move { body.into_response() }
                    },
                )
            })
            .collect()
    }

    async fn initialize(&self) -> Result<(), BoxError> {
        match &self.failure {
            Some(cause) => Err(cause.clone().into()),
            None => Ok(()),
        }
    }
}

/// Read a response body as text.
pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
