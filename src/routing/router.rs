//! Route table and lookup.
//!
//! # Responsibilities
//! - Accept routes from the mount pipeline, in mount order
//! - Freeze into an immutable `Router` before serving
//! - Look up the first route matching a request
//!
//! # Design Decisions
//! - Append-only while mounting, immutable once frozen (shared via Arc without locks)
//! - First registered match wins; there is no specificity ranking
//! - Duplicate registrations are kept, the later one is simply unreachable
//! - Shadowed routes are reported at freeze time but never removed

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use futures_util::future::BoxFuture;

use crate::observability::metrics;
use crate::routing::matcher::{PathParams, PathPattern, PatternError};

/// Request handling logic attached to a route.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request<Body>, params: PathParams) -> BoxFuture<'static, Response>;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request<Body>, params: PathParams) -> BoxFuture<'static, Response> {
        Box::pin(self(req, params))
    }
}

pub type BoxHandler = Arc<dyn Handler>;

/// An endpoint declared by a plugin.
#[derive(Clone)]
pub struct Route {
    pub method: Method,
    pub pattern: String,
    pub handler: BoxHandler,
}

impl Route {
    pub fn new(method: Method, pattern: impl Into<String>, handler: impl Handler) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            handler: Arc::new(handler),
        }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// A route after it has been mounted, tagged with its owning plugin.
#[derive(Clone)]
pub struct RouteEntry {
    plugin: String,
    method: Method,
    pattern: PathPattern,
    handler: BoxHandler,
}

impl RouteEntry {
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.plugin, self.method, self.pattern)
    }
}

/// A later route that can never be reached because an earlier one covers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shadowing {
    /// Index of the unreachable route.
    pub route: usize,
    /// Index of the earlier route that wins instead.
    pub by: usize,
}

/// Mutable route table, written only by the mount pipeline.
#[derive(Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route owned by `plugin`.
    pub fn add_route(&mut self, plugin: &str, route: Route) -> Result<(), PatternError> {
        self.add_routes(plugin, vec![route])
    }

    /// Append all of `plugin`'s routes in order, or none of them if any
    /// pattern is invalid.
    pub fn add_routes(&mut self, plugin: &str, routes: Vec<Route>) -> Result<(), PatternError> {
        let parsed = routes
            .into_iter()
            .map(|route| {
                let pattern = PathPattern::parse(&route.pattern)?;
                Ok(RouteEntry {
                    plugin: plugin.to_string(),
                    method: route.method,
                    pattern,
                    handler: route.handler,
                })
            })
            .collect::<Result<Vec<_>, PatternError>>()?;

        for entry in &parsed {
            tracing::debug!(
                plugin = %plugin,
                method = %entry.method,
                pattern = %entry.pattern,
                "Route added"
            );
        }
        self.entries.extend(parsed);
        Ok(())
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find routes fully covered by an earlier route with the same method.
    pub fn shadowed_routes(&self) -> Vec<Shadowing> {
        let mut found = Vec::new();
        for (later, entry) in self.entries.iter().enumerate() {
            let winner = self.entries[..later]
                .iter()
                .position(|e| e.method == entry.method && e.pattern.covers(&entry.pattern));
            if let Some(by) = winner {
                found.push(Shadowing { route: later, by });
            }
        }
        found
    }

    /// Stop accepting routes. The returned router is read-only.
    pub fn freeze(self) -> Router {
        for Shadowing { route, by } in self.shadowed_routes() {
            let shadowed = &self.entries[route];
            let winner = &self.entries[by];
            tracing::warn!(
                plugin = %shadowed.plugin,
                method = %shadowed.method,
                pattern = %shadowed.pattern,
                shadowed_by_plugin = %winner.plugin,
                shadowed_by_pattern = %winner.pattern,
                "Shadowed route will never match"
            );
        }

        metrics::record_routes_mounted(self.entries.len());
        Router {
            entries: self.entries,
        }
    }
}

/// Outcome of a route lookup.
pub enum Resolution<'a> {
    Matched {
        entry: &'a RouteEntry,
        params: PathParams,
    },
    /// Some pattern matched the path, but not for this method.
    MethodNotAllowed,
    NotFound,
}

/// Frozen route table shared by all request tasks.
#[derive(Debug)]
pub struct Router {
    entries: Vec<RouteEntry>,
}

impl Router {
    /// Look up the first route registered for this method and path.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let mut path_matched = false;
        for entry in &self.entries {
            if let Some(params) = entry.pattern.matches(path) {
                if entry.method == *method {
                    return Resolution::Matched { entry, params };
                }
                path_matched = true;
            }
        }

        if path_matched {
            Resolution::MethodNotAllowed
        } else {
            Resolution::NotFound
        }
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
