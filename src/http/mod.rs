//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum, middleware)
//!     → request.rs (assign request ID)
//!     → routing::Router::resolve (first matching plugin route)
//!     → plugin handler
//!     → response.rs (JSON errors)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::{GatewayError, GatewayResult};
pub use server::HttpServer;
