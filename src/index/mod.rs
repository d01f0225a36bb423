//! The on-disk index: shard store, document stats, stored documents, and the
//! write path that feeds them.

pub mod doc_stats;
pub mod doc_store;
pub mod partition;
pub mod shard;
pub mod writer;

pub use doc_stats::DocStatsStore;
pub use doc_store::DocumentStore;
pub use partition::{HashPartitioner, LeadingCharPartitioner, PartitionStrategy, ShardPartitioner};
pub use shard::{Posting, ShardLocking, ShardStore};
pub use writer::{IndexReport, IndexWriter};
