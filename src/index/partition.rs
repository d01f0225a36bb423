//! Partition functions that assign terms to shards.
//!
//! The only contract is determinism: the same term must map to the same shard
//! key on every call, for every document, across process restarts. Keys end
//! up in file names, so they are restricted to ASCII alphanumerics and `_`.

use serde::{Deserialize, Serialize};

/// Shard key for terms whose leading character is not alphabetic.
pub const FALLBACK_SHARD: &str = "_";

/// Maps a term to the key of the shard that stores its postings.
pub trait ShardPartitioner: Send + Sync + std::fmt::Debug {
    /// Shard key for `term`.
    fn shard_key(&self, term: &str) -> String;

    /// Get the name of this partitioner.
    fn name(&self) -> &'static str;

    /// Name plus every setting that changes key assignment.
    ///
    /// Two partitioners with equal fingerprints must map every term to the
    /// same key. An index is only reopened with a matching fingerprint.
    fn fingerprint(&self) -> String {
        self.name().to_string()
    }
}

/// Partitions by the term's leading character.
///
/// ASCII letters map to themselves (`"peter"` lives in shard `p`), other
/// alphabetic characters map to their code point (`"été"` lives in shard
/// `ue9`), and everything else shares [`FALLBACK_SHARD`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingCharPartitioner;

impl ShardPartitioner for LeadingCharPartitioner {
    fn shard_key(&self, term: &str) -> String {
        match term.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => c.to_ascii_lowercase().to_string(),
            Some(c) if c.is_alphabetic() => format!("u{:x}", c as u32),
            _ => FALLBACK_SHARD.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "leading_char"
    }
}

/// Partitions by a CRC32 hash of the term into a fixed number of buckets.
///
/// Spreads terms more evenly than [`LeadingCharPartitioner`] at the cost of
/// shard files that are no longer browsable by initial letter.
#[derive(Debug, Clone, Copy)]
pub struct HashPartitioner {
    buckets: u32,
}

impl HashPartitioner {
    /// Create a partitioner with `buckets` shards (at least one).
    pub fn new(buckets: u32) -> Self {
        HashPartitioner {
            buckets: buckets.max(1),
        }
    }

    pub fn buckets(&self) -> u32 {
        self.buckets
    }
}

impl Default for HashPartitioner {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ShardPartitioner for HashPartitioner {
    fn shard_key(&self, term: &str) -> String {
        format!("h{:04x}", crc32fast::hash(term.as_bytes()) % self.buckets)
    }

    fn name(&self) -> &'static str {
        "hash"
    }

    fn fingerprint(&self) -> String {
        format!("hash:{}", self.buckets)
    }
}

/// Serializable choice of partition function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum PartitionStrategy {
    /// [`LeadingCharPartitioner`]
    #[default]
    LeadingChar,
    /// [`HashPartitioner`] with the given bucket count
    Hash { buckets: u32 },
}

impl PartitionStrategy {
    /// Build the partitioner this strategy names.
    pub fn build(&self) -> Box<dyn ShardPartitioner> {
        match self {
            PartitionStrategy::LeadingChar => Box::new(LeadingCharPartitioner),
            PartitionStrategy::Hash { buckets } => Box::new(HashPartitioner::new(*buckets)),
        }
    }
}
