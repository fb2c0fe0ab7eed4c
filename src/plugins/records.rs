//! CRUD endpoints shared by record-keeping plugins.
//!
//! A record kind (user, permission) lives in its own index and is addressed
//! by one path parameter. GET, PUT, PATCH and DELETE are mounted in that
//! order under `<prefix>/{<id param>}`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::http::{GatewayError, GatewayResult};
use crate::routing::{PathParams, Route};
use crate::store::DocumentIndex;

/// Largest accepted request body for record writes.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Operations a principal is allowed to perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    #[default]
    Noop,
    Read,
    Write,
    Delete,
}

/// A document type managed through the CRUD routes.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Path parameter carrying the document id.
    const ID_PARAM: &'static str;

    fn set_id(&mut self, id: &str);

    /// Fields a PATCH is allowed to change, taken from a partial record.
    fn updatable_fields(&self) -> Map<String, Value>;

    /// Strip secrets before the record leaves the gateway.
    fn redacted(self) -> Self;
}

/// GET, PUT, PATCH and DELETE routes for `R` under `prefix`.
pub fn crud_routes<R: Record>(prefix: &str, store: Arc<DocumentIndex>) -> Vec<Route> {
    let pattern = format!("{}/{{{}}}", prefix, R::ID_PARAM);

    let get = {
        let store = store.clone();
        move |_req: Request<Body>, params: PathParams| {
            let store = store.clone();
            async move { get_record::<R>(&store, &params).await.into_response() }
        }
    };
    let put = {
        let store = store.clone();
        move |req: Request<Body>, params: PathParams| {
            let store = store.clone();
            async move { put_record::<R>(&store, &params, req).await.into_response() }
        }
    };
    let patch = {
        let store = store.clone();
        move |req: Request<Body>, params: PathParams| {
            let store = store.clone();
            async move { patch_record::<R>(&store, &params, req).await.into_response() }
        }
    };
    let delete = move |_req: Request<Body>, params: PathParams| {
        let store = store.clone();
        async move { delete_record::<R>(&store, &params).await.into_response() }
    };

    vec![
        Route::new(Method::GET, pattern.as_str(), get),
        Route::new(Method::PUT, pattern.as_str(), put),
        Route::new(Method::PATCH, pattern.as_str(), patch),
        Route::new(Method::DELETE, pattern.as_str(), delete),
    ]
}

fn record_id<R: Record>(params: &PathParams) -> GatewayResult<String> {
    params
        .get(R::ID_PARAM)
        .map(str::to_string)
        .ok_or_else(|| GatewayError::BadRequest(format!("missing {}", R::ID_PARAM)))
}

async fn read_json<R: Record>(req: Request<Body>) -> GatewayResult<R> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::BadRequest(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::BadRequest(e.to_string()))
}

async fn get_record<R: Record>(store: &DocumentIndex, params: &PathParams) -> GatewayResult<Json<R>> {
    let id = record_id::<R>(params)?;
    let record: R = store.get(&id).await?;
    Ok(Json(record.redacted()))
}

async fn put_record<R: Record>(
    store: &DocumentIndex,
    params: &PathParams,
    req: Request<Body>,
) -> GatewayResult<Response> {
    let id = record_id::<R>(params)?;
    let mut record: R = read_json(req).await?;
    record.set_id(&id);
    store.put(&id, &record).await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "id": id }))).into_response())
}

async fn patch_record<R: Record>(
    store: &DocumentIndex,
    params: &PathParams,
    req: Request<Body>,
) -> GatewayResult<Json<Value>> {
    let id = record_id::<R>(params)?;
    let partial: R = read_json(req).await?;
    let fields = partial.updatable_fields();
    if fields.is_empty() {
        return Err(GatewayError::BadRequest("no updatable fields in request".into()));
    }
    store.update(&id, fields).await?;
    Ok(Json(json!({ "ok": true, "id": id })))
}

async fn delete_record<R: Record>(store: &DocumentIndex, params: &PathParams) -> GatewayResult<Json<Value>> {
    let id = record_id::<R>(params)?;
    store.delete(&id).await?;
    Ok(Json(json!({ "ok": true, "id": id })))
}

/// Shared PATCH rules: `acl` and `indices` when present, `op` when not `noop`.
pub(crate) fn access_fields(
    acl: &Option<Vec<String>>,
    op: Op,
    indices: &Option<Vec<String>>,
) -> Map<String, Value> {
    let mut fields = Map::new();
    if let Some(acl) = acl {
        fields.insert("acl".into(), json!(acl));
    }
    if op != Op::Noop {
        fields.insert("op".into(), json!(op));
    }
    if let Some(indices) = indices {
        fields.insert("indices".into(), json!(indices));
    }
    fields
}
