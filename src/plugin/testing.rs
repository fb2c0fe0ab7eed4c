//! Stub plugins for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::IntoResponse;

use crate::plugin::{BoxError, PluginUnit};
use crate::routing::{PathParams, Route};

/// Plugin whose handlers answer with `"<plugin> <pattern>"`.
pub struct StubPlugin {
    name: String,
    routes: Vec<(Method, String)>,
    failure: Option<String>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl StubPlugin {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            routes: Vec::new(),
            failure: None,
            journal: None,
        }
    }

    pub fn route(mut self, method: Method, pattern: &str) -> Self {
        self.routes.push((method, pattern.to_string()));
        self
    }

    /// Make `initialize` fail with `cause`.
    pub fn failing(mut self, cause: &str) -> Self {
        self.failure = Some(cause.to_string());
        self
    }

    /// Record the plugin name into `journal` when initialized.
    pub fn journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
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
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(self.name.clone());
        }
        match &self.failure {
            Some(cause) => Err(cause.clone().into()),
            None => Ok(()),
        }
    }
}
