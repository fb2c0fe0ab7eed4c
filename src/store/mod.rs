//! Search engine document storage.
//!
//! # Data Flow
//! ```text
//! users / permissions / auth plugins
//!     → index.rs DocumentIndex (one index per record kind)
//!     → reqwest → search cluster REST API
//! ```
//!
//! # Design Decisions
//! - One shared `reqwest::Client` per process (connection pooling)
//! - A missing document is its own error, so handlers can answer 404
//! - Index creation is idempotent and happens at plugin mount time

pub mod index;

pub use index::DocumentIndex;

use thiserror::Error;

/// Errors talking to the search cluster.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0:?} not found")]
    NotFound(String),

    #[error("search engine request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid search engine url: {0}")]
    Url(String),

    #[error("malformed document: {0}")]
    Decode(#[from] serde_json::Error),
}
