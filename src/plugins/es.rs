//! Search engine proxy plugin.
//!
//! Forwards every request that no other plugin claimed to the search
//! cluster. Its patterns match any path, so it must be mounted last.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Uri, Version},
    response::{IntoResponse, Response},
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use url::Url;

use crate::http::GatewayError;
use crate::plugin::{BoxError, PluginUnit};
use crate::routing::{PathParams, Route};
use crate::store::StoreError;

const PROXIED_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

const PROXIED_PATTERNS: [&str; 3] = ["/", "/{index}", "/{index}/{*rest}"];

/// How long mount-time initialization waits for the cluster to answer.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SearchProxy {
    /// Cluster base URL without a trailing slash.
    base: String,
    client: Client<HttpConnector, Body>,
}

impl SearchProxy {
    pub const NAME: &'static str = "es";

    pub fn new(cluster_url: &str) -> Result<Self, StoreError> {
        let url = Url::parse(cluster_url).map_err(|e| StoreError::Url(e.to_string()))?;
        if url.scheme() != "http" {
            return Err(StoreError::Url(format!(
                "{cluster_url}: only http cluster urls can be proxied"
            )));
        }

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self {
            base: cluster_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Absolute upstream URI for a request URI.
    fn upstream_uri(base: &str, uri: &Uri) -> Result<Uri, GatewayError> {
        let path_and_query = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
        format!("{base}{path_and_query}")
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| GatewayError::Internal(e.to_string()))
    }
}

async fn forward(client: Client<HttpConnector, Body>, base: String, request: Request<Body>) -> Response {
    let (mut parts, body) = request.into_parts();
    parts.uri = match SearchProxy::upstream_uri(&base, &parts.uri) {
        Ok(uri) => uri,
        Err(e) => return e.into_response(),
    };
    parts.version = Version::HTTP_11;
    parts.headers.remove(header::HOST);

    let method = parts.method.clone();
    let uri = parts.uri.clone();
    match client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            tracing::debug!(method = %method, uri = %uri, status = %response.status(), "Proxied request");
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(method = %method, uri = %uri, error = %e, "Upstream error");
            GatewayError::Upstream(e.to_string()).into_response()
        }
    }
}

#[async_trait]
impl PluginUnit for SearchProxy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn routes(&self) -> Vec<Route> {
        let mut routes = Vec::with_capacity(PROXIED_PATTERNS.len() * PROXIED_METHODS.len());
        for pattern in PROXIED_PATTERNS {
            for method in PROXIED_METHODS {
                let client = self.client.clone();
                let base = self.base.clone();
                routes.push(Route::new(
                    method,
                    pattern,
                    move |req: Request<Body>, _params: PathParams| {
                        forward(client.clone(), base.clone(), req)
                    },
                ));
            }
        }
        routes
    }

    /// Refuse to start unless the cluster answers.
    async fn initialize(&self) -> Result<(), BoxError> {
        let probe = Request::builder()
            .method(Method::GET)
            .uri(format!("{}/", self.base))
            .body(Body::empty())?;

        let response = tokio::time::timeout(PROBE_TIMEOUT, self.client.request(probe))
            .await
            .map_err(|_| format!("{} did not answer within {:?}", self.base, PROBE_TIMEOUT))??;

        tracing::info!(cluster = %self.base, status = %response.status(), "Search cluster reachable");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_uri_keeps_path_and_query() {
        let uri: Uri = "/twitter/_search?q=rust".parse().unwrap();
        let upstream = SearchProxy::upstream_uri("http://localhost:9200", &uri).unwrap();
        assert_eq!(upstream.to_string(), "http://localhost:9200/twitter/_search?q=rust");
    }

    #[test]
    fn test_only_http_is_proxied() {
        assert!(SearchProxy::new("https://localhost:9200").is_err());
        assert!(SearchProxy::new("http://localhost:9200/").is_ok());
    }

    #[tokio::test]
    async fn test_routes_cover_every_method_and_depth() {
        let proxy = SearchProxy::new("http://localhost:9200").unwrap();
        let routes = proxy.routes();
        assert_eq!(routes.len(), 18);
        assert_eq!(routes[0].pattern, "/");
        assert_eq!(routes[17].pattern, "/{index}/{*rest}");
        assert_eq!(routes[17].method, Method::DELETE);
    }
}
