//! Authentication plugin.
//!
//! `GET /_health` answers liveness probes. `GET /_auth` checks HTTP Basic
//! credentials against the users index and returns the caller's record.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request},
    response::IntoResponse,
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use crate::http::{GatewayError, GatewayResult};
use crate::plugin::PluginUnit;
use crate::plugins::records::Record;
use crate::plugins::users::User;
use crate::routing::{PathParams, Route};
use crate::store::{DocumentIndex, StoreError};

pub struct AuthPlugin {
    users: Arc<DocumentIndex>,
}

impl AuthPlugin {
    pub const NAME: &'static str = "auth";

    pub fn new(users: DocumentIndex) -> Self {
        Self {
            users: Arc::new(users),
        }
    }
}

#[async_trait]
impl PluginUnit for AuthPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn routes(&self) -> Vec<Route> {
        let users = self.users.clone();
        vec![
            Route::new(Method::GET, "/_health", health),
            Route::new(Method::GET, "/_auth", move |req: Request<Body>, _params: PathParams| {
                let users = users.clone();
                async move {
                    authenticate(&users, req.headers())
                        .await
                        .map(|user| Json(user.redacted()))
                        .into_response()
                }
            }),
        ]
    }
}

async fn health(_req: Request<Body>, _params: PathParams) -> axum::response::Response {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

/// Extract `(username, password)` from a Basic `Authorization` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

async fn authenticate(users: &DocumentIndex, headers: &HeaderMap) -> GatewayResult<User> {
    let (user_id, password) = basic_credentials(headers).ok_or(GatewayError::Unauthorized)?;

    let user: User = match users.get(&user_id).await {
        Ok(user) => user,
        Err(StoreError::NotFound(_)) => {
            tracing::debug!(user_id = %user_id, "Unknown user");
            return Err(GatewayError::Unauthorized);
        }
        Err(e) => return Err(e.into()),
    };

    if user.password.as_deref() != Some(password.as_str()) {
        tracing::debug!(user_id = %user_id, "Password mismatch");
        return Err(GatewayError::Unauthorized);
    }
    Ok(user)
}
