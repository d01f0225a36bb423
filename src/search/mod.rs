//! Query execution and ranking.

pub mod request;
pub mod searcher;

pub use request::{SearchHit, SearchRequest, SearchResults};
pub use searcher::Searcher;
