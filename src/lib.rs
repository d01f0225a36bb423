//! # Microsearch
//!
//! A minimal embeddable full-text search engine.
//!
//! Documents (an id plus named text fields) are broken into overlapping
//! character n-grams and stored in a sharded inverted index on disk. Queries
//! are tokenized the same way and ranked by normalized term frequency.
//!
//! ## Features
//!
//! - Substring-tolerant matching through character n-grams
//! - One JSON file per shard, replaced atomically on every write
//! - Pluggable storage backends and partition functions
//! - Deterministic ranking, ties broken by document id
//!
//! ## Limits
//!
//! Designed for small corpora and a single writer. There is no deletion:
//! reindexing an id appends postings and stale matches can persist. Writes
//! spanning several shards are not transactional.

pub mod analysis;
pub mod cli;
pub mod document;
pub mod engine;
pub mod error;
pub mod index;
pub mod search;
pub mod storage;

pub mod prelude {
    pub use crate::document::Document;
    pub use crate::engine::Microsearch;
    pub use crate::engine::config::EngineConfig;
    pub use crate::error::{MicrosearchError, Result};
    pub use crate::search::{SearchHit, SearchRequest, SearchResults};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
