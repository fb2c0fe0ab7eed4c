//! Plugin subsystem.
//!
//! # Data Flow
//! ```text
//! Composition root (plugins::register_builtin)
//!     → registry.rs (unique by name)
//!     → Registry::snapshot (copy, unspecified order)
//!     → order.rs OrderPolicy::sort (catch-all last, others by name)
//!     → mount.rs mount_all (initialize + add routes, stop on first failure)
//!     → RouteTable::freeze → Router
//! ```
//!
//! # Design Decisions
//! - Plugins never see each other; precedence comes only from mount order
//! - Every failure is fatal and carries the failing plugin's name
//! - Registration is explicit, there is no load-time self-registration

pub mod mount;
pub mod order;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use thiserror::Error;

use crate::routing::{Route, RouteTable};

pub use mount::mount_all;
pub use order::OrderPolicy;
pub use registry::{Registry, RegistryError};

/// Boxed error returned by plugin initialization.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A plugin failed while being mounted.
#[derive(Debug, Error)]
#[error("plugin {plugin:?} failed to initialize: {source}")]
pub struct InitializationError {
    pub plugin: String,
    #[source]
    pub source: BoxError,
}

impl InitializationError {
    pub fn new(plugin: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            plugin: plugin.into(),
            source: source.into(),
        }
    }
}

/// A capability module contributing routes to the gateway.
#[async_trait]
pub trait PluginUnit: Send + Sync {
    /// Stable, non-empty identifier. Used for uniqueness and ordering.
    fn name(&self) -> &str;

    /// Endpoints to mount, in the order they should be matched.
    fn routes(&self) -> Vec<Route>;

    /// Mount-time setup such as opening a backing store. Returning an
    /// error vetoes startup.
    async fn initialize(&self) -> Result<(), BoxError> {
        Ok(())
    }

    /// Initialize, then add every declared route to `table` in order.
    ///
    /// A unit that fails leaves none of its routes in `table`.
    async fn mount(&self, table: &mut RouteTable) -> Result<(), InitializationError> {
        self.initialize()
            .await
            .map_err(|e| InitializationError::new(self.name(), e))?;

        table
            .add_routes(self.name(), self.routes())
            .map_err(|e| InitializationError::new(self.name(), e))
    }
}

impl std::fmt::Debug for dyn PluginUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginUnit")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}
