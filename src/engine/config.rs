//! Configuration for the search engine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::ngram::{DEFAULT_MAX_GRAM, DEFAULT_MIN_GRAM, NgramTokenizer};
use crate::error::{MicrosearchError, Result};
use crate::index::partition::PartitionStrategy;
use crate::index::shard::ShardLocking;
use crate::storage::StorageConfig;

/// A small list of common English words that add little to relevance.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "no", "not", "of", "on", "or", "s", "such", "t", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Settings fixed when an engine is opened.
///
/// The gram range and partition strategy shape the on-disk index and are
/// recorded in its manifest; reopening an index with different values is
/// rejected. Everything else may change between runs.
///
/// # Example
///
/// ```
/// use microsearch::engine::config::EngineConfig;
/// use microsearch::index::ShardLocking;
///
/// let config = EngineConfig::default()
///     .with_min_gram(2)
///     .with_max_gram(4)
///     .with_locking(ShardLocking::PerShard);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shortest n-gram emitted for words longer than this.
    pub min_gram: usize,

    /// Longest n-gram emitted.
    pub max_gram: usize,

    /// Words skipped by the tokenizer. Empty by default.
    pub stop_words: Vec<String>,

    /// How terms are assigned to shard files.
    pub partition: PartitionStrategy,

    /// Coordination between concurrent writers in this process.
    pub locking: ShardLocking,

    /// Keep a copy of every indexed document for retrieval with hits.
    pub store_documents: bool,

    /// Storage backend settings.
    pub storage: StorageConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            min_gram: DEFAULT_MIN_GRAM,
            max_gram: DEFAULT_MAX_GRAM,
            stop_words: Vec::new(),
            partition: PartitionStrategy::default(),
            locking: ShardLocking::default(),
            store_documents: true,
            storage: StorageConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            MicrosearchError::invalid_config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: EngineConfig = serde_json::from_slice(&bytes).map_err(|e| {
            MicrosearchError::invalid_config(format!("cannot parse {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the gram range.
    pub fn validate(&self) -> Result<()> {
        if self.min_gram == 0 {
            return Err(MicrosearchError::invalid_config(
                "min_gram must be at least 1",
            ));
        }
        if self.max_gram < self.min_gram {
            return Err(MicrosearchError::invalid_config(format!(
                "max_gram ({}) must be >= min_gram ({})",
                self.max_gram, self.min_gram
            )));
        }
        Ok(())
    }

    pub fn with_min_gram(mut self, min_gram: usize) -> Self {
        self.min_gram = min_gram;
        self
    }

    pub fn with_max_gram(mut self, max_gram: usize) -> Self {
        self.max_gram = max_gram;
        self
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Use [`ENGLISH_STOP_WORDS`].
    pub fn with_english_stop_words(self) -> Self {
        self.with_stop_words(ENGLISH_STOP_WORDS.iter().copied())
    }

    pub fn with_partition(mut self, partition: PartitionStrategy) -> Self {
        self.partition = partition;
        self
    }

    pub fn with_locking(mut self, locking: ShardLocking) -> Self {
        self.locking = locking;
        self
    }

    pub fn with_store_documents(mut self, store_documents: bool) -> Self {
        self.store_documents = store_documents;
        self
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Build the tokenizer these settings describe.
    pub fn tokenizer(&self) -> Result<NgramTokenizer> {
        self.validate()?;
        Ok(NgramTokenizer::new(self.min_gram, self.max_gram)?
            .with_stop_words(self.stop_words.iter().map(|w| w.to_lowercase())))
    }
}
