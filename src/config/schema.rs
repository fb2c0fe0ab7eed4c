//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and
//! every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::plugin::order::DEFAULT_CATCH_ALL;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (address, port).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Plugin mounting settings.
    pub plugins: PluginsConfig,

    /// Search engine connection used by the built-in plugins.
    pub search: SearchConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or IP to serve on.
    pub address: String,

    /// Port number.
    pub port: u16,
}

impl ListenerConfig {
    /// `address:port`, suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 8000,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,

    /// Rotate the log file once it would exceed this many megabytes.
    pub log_max_size_mb: u64,

    /// Rotated log files to keep.
    pub log_max_backups: usize,

    /// Delete rotated log files older than this many days. 0 keeps them.
    pub log_max_age_days: u64,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
            log_max_size_mb: 100,
            log_max_backups: 10,
            log_max_age_days: 14,
        }
    }
}

/// Plugin mounting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginsConfig {
    /// Name of the plugin mounted after all others.
    pub catch_all: String,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            catch_all: DEFAULT_CATCH_ALL.to_string(),
        }
    }
}

/// Search engine connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Cluster base URL. Overridden by `ES_CLUSTER_URL`.
    pub url: String,

    /// Index holding user records. Overridden by `USERS_ES_INDEX`.
    pub users_index: String,

    /// Index holding permission records. Overridden by `PERMISSIONS_ES_INDEX`.
    pub permissions_index: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            users_index: ".users".to_string(),
            permissions_index: ".permissions".to_string(),
        }
    }
}
