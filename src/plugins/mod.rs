//! Built-in capability plugins.
//!
//! # Plugins
//! - `auth`: liveness and Basic credential checks (`/_health`, `/_auth`)
//! - `permissions`: permission records (`/_permission/{username}`)
//! - `users`: user records (`/_user/{user_id}`)
//! - `es`: catch-all proxy to the search cluster
//!
//! `register_builtin` is the composition root: the only place that knows
//! which plugins exist. Plugins never reference each other.

pub mod auth;
pub mod es;
pub mod permissions;
pub mod records;
pub mod users;

use std::sync::Arc;
use std::time::Duration;

use crate::config::GatewayConfig;
use crate::lifecycle::StartupError;
use crate::plugin::Registry;
use crate::store::{DocumentIndex, StoreError};

pub use auth::AuthPlugin;
pub use es::SearchProxy;
pub use permissions::PermissionsPlugin;
pub use users::UsersPlugin;

/// Construct and register every built-in plugin.
pub fn register_builtin(registry: &mut Registry, config: &GatewayConfig) -> Result<(), StartupError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeouts.request_secs))
        .build()
        .map_err(StoreError::from)?;

    let search = &config.search;
    let users_index = DocumentIndex::new(client.clone(), &search.url, &search.users_index)?;
    let permissions_index = DocumentIndex::new(client, &search.url, &search.permissions_index)?;

    registry.register(Arc::new(AuthPlugin::new(users_index.clone())))?;
    registry.register(Arc::new(PermissionsPlugin::new(permissions_index)))?;
    registry.register(Arc::new(UsersPlugin::new(users_index)))?;
    registry.register(Arc::new(SearchProxy::new(&search.url)?))?;

    // The configured catch-all must be one of the registered plugins.
    if !registry.contains(&config.plugins.catch_all) {
        return Err(StartupError::UnknownCatchAll(config.plugins.catch_all.clone()));
    }

    Ok(())
}
