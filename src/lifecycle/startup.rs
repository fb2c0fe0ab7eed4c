//! Startup orchestration.
//!
//! # Responsibilities
//! - Snapshot the plugin registry
//! - Order the snapshot with the mount policy
//! - Mount every plugin into one route table
//! - Freeze the table into the router handed to the HTTP server
//!
//! # Design Decisions
//! - Fail fast: the first error aborts startup before any listener is bound
//! - Subsystems initialize in order, not concurrently
//! - The registry is consumed, so no plugin can register after mounting starts

use std::sync::Arc;

use thiserror::Error;

use crate::config::env_file::EnvFileError;
use crate::config::loader::ConfigError;
use crate::observability::logging::LoggingError;
use crate::plugin::{mount_all, InitializationError, OrderPolicy, Registry, RegistryError};
use crate::routing::{RouteTable, Router};
use crate::store::StoreError;

/// Every way startup can fail. All of them are fatal.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("reading env file: {0}")]
    EnvFile(#[from] EnvFileError),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("registration: {0}")]
    Registration(#[from] RegistryError),

    #[error("catch-all plugin {0:?} is not registered")]
    UnknownCatchAll(String),

    #[error(transparent)]
    Initialization(#[from] InitializationError),

    #[error("search engine: {0}")]
    Store(#[from] StoreError),

    #[error("logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The fully composed gateway, ready to serve.
#[derive(Debug)]
pub struct Gateway {
    router: Arc<Router>,
    mount_order: Vec<String>,
}

impl Gateway {
    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }

    /// Plugin names in the order they were mounted.
    pub fn mount_order(&self) -> &[String] {
        &self.mount_order
    }
}

/// Order and mount every registered plugin.
pub async fn bootstrap(registry: Registry, policy: &OrderPolicy) -> Result<Gateway, StartupError> {
    let mut plugins = registry.snapshot();
    policy.sort(&mut plugins);

    let order: Vec<&str> = plugins.iter().map(|p| p.name()).collect();
    tracing::info!(plugins = ?order, "Mounting plugins");

    let mut table = RouteTable::new();
    let mount_order = mount_all(&plugins, &mut table).await?;

    let router = table.freeze();
    tracing::info!(
        plugins = mount_order.len(),
        routes = router.len(),
        "All plugins mounted"
    );

    Ok(Gateway {
        router: Arc::new(router),
        mount_order,
    })
}
