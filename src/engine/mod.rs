//! The embeddable search engine.
//!
//! [`Microsearch`] wires a storage backend, the n-gram tokenizer, the shard
//! store, the document stats store and the optional document store into one
//! handle with `index` and `search` operations.
//!
//! # Example
//!
//! ```
//! use microsearch::document::Document;
//! use microsearch::engine::Microsearch;
//!
//! let dir = tempfile::TempDir::new().unwrap();
//! let engine = Microsearch::open(dir.path()).unwrap();
//!
//! engine
//!     .index(
//!         "email_1",
//!         &Document::builder()
//!             .add_text("text", "Peter, I need those TPS reports on my desk")
//!             .build(),
//!     )
//!     .unwrap();
//!
//! let hits = engine.search("report").unwrap();
//! assert_eq!(hits[0].doc_id, "email_1");
//! ```

pub mod config;

use std::path::Path;
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::document::Document;
use crate::engine::config::EngineConfig;
use crate::error::{MicrosearchError, Result};
use crate::index::doc_stats::DocStatsStore;
use crate::index::doc_store::DocumentStore;
use crate::index::partition::ShardPartitioner;
use crate::index::shard::ShardStore;
use crate::index::writer::{IndexReport, IndexWriter};
use crate::search::request::{SearchHit, SearchRequest, SearchResults};
use crate::search::searcher::Searcher;
use crate::storage::{FileStorage, Storage, read_optional, write_atomic};

/// Name of the manifest file in storage.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Settings an existing index was built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Library version that created the index.
    pub version: String,
    pub min_gram: usize,
    pub max_gram: usize,
    /// Fingerprint of the partition function, see
    /// [`ShardPartitioner::fingerprint`].
    pub partitioner: String,
}

impl IndexManifest {
    fn check_compatible(&self, expected: &IndexManifest) -> Result<()> {
        if self.min_gram != expected.min_gram
            || self.max_gram != expected.max_gram
            || self.partitioner != expected.partitioner
        {
            return Err(MicrosearchError::invalid_config(format!(
                "index was built with grams {}..={} and partitioner {:?}, \
                 but opened with grams {}..={} and partitioner {:?}",
                self.min_gram,
                self.max_gram,
                self.partitioner,
                expected.min_gram,
                expected.max_gram,
                expected.partitioner
            )));
        }
        Ok(())
    }
}

/// Summary of an index's contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Documents with a stats record.
    pub total_documents: usize,
    /// Shard files present.
    pub total_shards: usize,
    /// Distinct terms across all shards.
    pub total_terms: usize,
    /// Library version that created the index.
    pub version: String,
}

/// An embeddable full-text search engine over one storage location.
///
/// Every operation runs to completion on the calling thread. The handle is
/// `Send + Sync`; concurrent `index` calls touching the same shard lose
/// postings unless the engine was configured with
/// [`ShardLocking::PerShard`](crate::index::ShardLocking::PerShard).
#[derive(Debug)]
pub struct Microsearch {
    config: EngineConfig,
    storage: Arc<dyn Storage>,
    shards: Arc<ShardStore>,
    stats: Arc<DocStatsStore>,
    documents: Option<Arc<DocumentStore>>,
    writer: IndexWriter,
    searcher: Searcher,
    manifest: IndexManifest,
}

impl Microsearch {
    /// Open (or create) an index in `path` with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, EngineConfig::default())
    }

    /// Open (or create) an index in `path`.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: EngineConfig) -> Result<Self> {
        let storage = FileStorage::new(path.as_ref(), config.storage.clone())?;
        info!("opening index at {}", path.as_ref().display());
        Self::with_storage(Arc::new(storage), config)
    }

    /// Open an index over an existing storage backend.
    pub fn with_storage(storage: Arc<dyn Storage>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let partitioner: Arc<dyn ShardPartitioner> = Arc::from(config.partition.build());
        Self::with_partitioner(storage, config, partitioner)
    }

    /// Open an index with a custom partition function.
    ///
    /// The partitioner's fingerprint is recorded in the manifest, and the
    /// index must always be reopened with a partitioner of the same
    /// fingerprint.
    pub fn with_partitioner(
        storage: Arc<dyn Storage>,
        config: EngineConfig,
        partitioner: Arc<dyn ShardPartitioner>,
    ) -> Result<Self> {
        let tokenizer: Arc<dyn Tokenizer> = Arc::new(config.tokenizer()?);

        let manifest = IndexManifest {
            version: crate::VERSION.to_string(),
            min_gram: config.min_gram,
            max_gram: config.max_gram,
            partitioner: partitioner.fingerprint(),
        };
        let manifest = Self::load_or_create_manifest(storage.as_ref(), manifest)?;

        let shards = Arc::new(ShardStore::new(
            Arc::clone(&storage),
            partitioner,
            config.locking,
        ));
        let stats = Arc::new(DocStatsStore::new(Arc::clone(&storage)).with_locking(config.locking));
        let documents = config.store_documents.then(|| {
            Arc::new(DocumentStore::new(Arc::clone(&storage)).with_locking(config.locking))
        });

        let mut writer =
            IndexWriter::new(Arc::clone(&tokenizer), Arc::clone(&shards), Arc::clone(&stats));
        let mut searcher = Searcher::new(tokenizer, Arc::clone(&shards), Arc::clone(&stats));
        if let Some(documents) = &documents {
            writer = writer.with_document_store(Arc::clone(documents));
            searcher = searcher.with_document_store(Arc::clone(documents));
        }

        Ok(Microsearch {
            config,
            storage,
            shards,
            stats,
            documents,
            writer,
            searcher,
            manifest,
        })
    }

    fn load_or_create_manifest(
        storage: &dyn Storage,
        expected: IndexManifest,
    ) -> Result<IndexManifest> {
        match read_optional(storage, MANIFEST_FILE)? {
            Some(bytes) => {
                let manifest: IndexManifest = serde_json::from_slice(&bytes).map_err(|e| {
                    MicrosearchError::storage(format!("Malformed manifest {MANIFEST_FILE}: {e}"))
                })?;
                manifest.check_compatible(&expected)?;
                Ok(manifest)
            }
            None => {
                write_atomic(storage, MANIFEST_FILE, &serde_json::to_vec(&expected)?)?;
                Ok(expected)
            }
        }
    }

    /// Index `document` under `doc_id`.
    ///
    /// Reindexing an id appends new postings next to the old ones; nothing
    /// is removed.
    pub fn index(&self, doc_id: &str, document: &Document) -> Result<IndexReport> {
        self.writer.index(doc_id, document)
    }

    /// Index a document given as `(field name, text)` pairs.
    pub fn index_fields<I, K, V>(&self, doc_id: &str, fields: I) -> Result<IndexReport>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let document: Document = fields.into_iter().collect();
        self.index(doc_id, &document)
    }

    /// Every document matching `query`, best first, ties by ascending id.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        self.searcher.search(query)
    }

    /// One page of results, optionally with stored documents attached.
    pub fn search_with(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.searcher.search_with(request)
    }

    /// The stored copy of `doc_id`. Always `None` when documents are not
    /// stored.
    pub fn get_document(&self, doc_id: &str) -> Result<Option<Document>> {
        match &self.documents {
            Some(documents) => documents.load(doc_id),
            None => Ok(None),
        }
    }

    /// Count documents, shards and distinct terms.
    ///
    /// Reads every shard, so the cost grows with the index.
    pub fn stats(&self) -> Result<IndexStats> {
        let shard_keys = self.shards.shard_keys()?;
        let mut total_terms = 0;
        for key in &shard_keys {
            total_terms += self.shards.load_shard(key)?.len();
        }

        Ok(IndexStats {
            total_documents: self.stats.len()?,
            total_shards: shard_keys.len(),
            total_terms,
            version: self.manifest.version.clone(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// The underlying shard store.
    pub fn shard_store(&self) -> &ShardStore {
        &self.shards
    }
}
