//! Mount pipeline.
//!
//! # Responsibilities
//! - Mount plugins one at a time, in the order given
//! - Stop at the first failing plugin and report it by name
//!
//! # Design Decisions
//! - Sequential, never concurrent: failure order matches mount order
//! - No retry and no partial startup; routes of plugins mounted before the
//!   failure stay in the table, the failing plugin adds none, and a failed
//!   table is never frozen or served
//! - Runs once per process; mounting twice into one table duplicates routes

use std::sync::Arc;
use std::time::Instant;

use crate::plugin::{InitializationError, PluginUnit};
use crate::routing::RouteTable;

/// Mount every plugin into `table`, in slice order.
///
/// Returns the names of the mounted plugins.
pub async fn mount_all(
    plugins: &[Arc<dyn PluginUnit>],
    table: &mut RouteTable,
) -> Result<Vec<String>, InitializationError> {
    let mut mounted = Vec::with_capacity(plugins.len());

    for plugin in plugins {
        let start = Instant::now();
        let before = table.len();

        if let Err(e) = plugin.mount(table).await {
            tracing::error!(
                plugin = %e.plugin,
                error = %e.source,
                "Plugin failed to mount"
            );
            return Err(e);
        }

        tracing::info!(
            plugin = %plugin.name(),
            routes = table.len() - before,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Plugin mounted"
        );
        mounted.push(plugin.name().to_string());
    }

    Ok(mounted)
}
