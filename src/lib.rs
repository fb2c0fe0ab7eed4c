//! Arc API gateway library.
//!
//! Independently written plugins register into one `Registry`; startup
//! orders them, mounts their routes into a single router and serves it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod plugin;
pub mod plugins;
pub mod routing;
pub mod store;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::{bootstrap, Gateway, Shutdown, StartupError};
pub use plugin::{OrderPolicy, PluginUnit, Registry};
