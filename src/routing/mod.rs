//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Mount pipeline (at startup):
//!     plugin routes, in mount order
//!     → router.rs RouteTable::add_route (parse pattern, append)
//!     → RouteTable::freeze (report shadowed routes)
//!     → Router, immutable, shared via Arc
//!
//! Incoming Request (method, path)
//!     → router.rs Router::resolve (linear scan)
//!     → matcher.rs (evaluate pattern, capture params)
//!     → Matched route, MethodNotAllowed or NotFound
//! ```
//!
//! # Design Decisions
//! - Routes are appended during startup only, never after serving begins
//! - First match wins, so mount order is route precedence
//! - Deterministic: same mount order always resolves the same route

pub mod matcher;
pub mod router;

pub use matcher::{PathParams, PathPattern, PatternError};
pub use router::{BoxHandler, Handler, Resolution, Route, RouteEntry, RouteTable, Router};
