//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Registry → snapshot → order → mount → freeze → Gateway
//!
//! Serving (http::server):
//!     Gateway router → axum listener
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → stop accepting → drain → exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: env and config first, then plugins, then listener
//! - Any startup error is fatal; the listener is never bound
//! - The router is frozen before the listener starts

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{bootstrap, Gateway, StartupError};
