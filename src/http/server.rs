//! HTTP server setup.
//!
//! # Responsibilities
//! - Wrap the frozen plugin router in an axum application
//! - Wire up middleware (request ID, tracing, timeout)
//! - Dispatch each request to the first matching plugin route
//! - Serve until a shutdown signal arrives
//!
//! Every request goes through a single fallback handler, so axum's own
//! route table is empty and precedence is decided by mount order alone.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::GatewayError;
use crate::lifecycle::signals::shutdown_signal;
use crate::observability::metrics;
use crate::routing::{Resolution, Router};

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    app: axum::Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server around an already frozen router.
    pub fn new(config: GatewayConfig, router: Arc<Router>) -> Self {
        let app = Self::build_app(&config, AppState { router });
        Self { app, config }
    }

    /// Build the axum application with all middleware layers.
    #[allow(deprecated)]
    fn build_app(config: &GatewayConfig, state: AppState) -> axum::Router {
        axum::Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The composed application, for in-process testing.
    pub fn app(&self) -> axum::Router {
        self.app.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.app.into_make_service())
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Looks up the first matching plugin route and runs its handler.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let rid = request_id(&request).to_string();

    match state.router.resolve(&method, &path) {
        Resolution::Matched { entry, params } => {
            tracing::debug!(
                request_id = %rid,
                plugin = %entry.plugin(),
                pattern = %entry.pattern(),
                "Dispatching request"
            );
            let response = entry.handler().call(request, params).await;
            metrics::record_request(entry.plugin(), method.as_str(), response.status().as_u16());
            response
        }
        Resolution::MethodNotAllowed => {
            tracing::debug!(request_id = %rid, method = %method, path = %path, "Method not allowed");
            metrics::record_request("none", method.as_str(), 405);
            GatewayError::MethodNotAllowed {
                method: method.to_string(),
                path,
            }
            .into_response()
        }
        Resolution::NotFound => {
            tracing::debug!(request_id = %rid, method = %method, path = %path, "No route matched");
            metrics::record_request("none", method.as_str(), 404);
            GatewayError::NotFound(path).into_response()
        }
    }
}
