//! The indexing write path.

use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::tokenizer::Tokenizer;
use crate::document::Document;
use crate::error::{MicrosearchError, Result};
use crate::index::doc_stats::DocStatsStore;
use crate::index::doc_store::DocumentStore;
use crate::index::shard::ShardStore;

/// What one call to [`IndexWriter::index`] wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexReport {
    pub doc_id: String,
    /// Distinct terms merged into the shard store.
    pub distinct_terms: usize,
    /// Sum of all term counts, recorded as the document's stats.
    pub total_terms: u64,
    /// Shard files replaced.
    pub shards_written: usize,
}

/// Tokenizes documents and merges their terms into the stores.
///
/// Indexing the same id twice appends a second set of postings; the earlier
/// postings stay. The stats record is overwritten with the latest total.
#[derive(Debug)]
pub struct IndexWriter {
    tokenizer: Arc<dyn Tokenizer>,
    shards: Arc<ShardStore>,
    stats: Arc<DocStatsStore>,
    documents: Option<Arc<DocumentStore>>,
}

impl IndexWriter {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        shards: Arc<ShardStore>,
        stats: Arc<DocStatsStore>,
    ) -> Self {
        IndexWriter {
            tokenizer,
            shards,
            stats,
            documents: None,
        }
    }

    /// Also keep a copy of every indexed document in `documents`.
    pub fn with_document_store(mut self, documents: Arc<DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Index `document` under `doc_id`.
    ///
    /// All field values are tokenized together. Every distinct term gets one
    /// posting carrying its count, then the document's total term count is
    /// recorded. A document that yields no terms still gets a stats record of
    /// zero.
    ///
    /// # Errors
    ///
    /// A validation error if `doc_id` is empty, raised before anything is
    /// written. A storage error if any write fails; writes that completed
    /// before the failure are not rolled back.
    pub fn index(&self, doc_id: &str, document: &Document) -> Result<IndexReport> {
        if doc_id.is_empty() {
            return Err(MicrosearchError::validation("document id must not be empty"));
        }

        if let Some(documents) = &self.documents {
            documents.save(doc_id, document)?;
        }

        let counts = self.tokenizer.tokenize(&document.text());
        let total_terms = counts.total();

        let shards_written = if counts.is_empty() {
            0
        } else {
            self.shards.merge_batch(doc_id, counts.iter())?
        };
        self.stats.record(doc_id, total_terms)?;

        debug!(
            "indexed {doc_id}: {} distinct terms, {total_terms} total, {shards_written} shards",
            counts.len()
        );

        Ok(IndexReport {
            doc_id: doc_id.to_string(),
            distinct_terms: counts.len(),
            total_terms,
            shards_written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tokenizer::ngram::NgramTokenizer;
    use crate::index::partition::LeadingCharPartitioner;
    use crate::index::shard::{Posting, ShardLocking};
    use crate::storage::{MemoryStorage, Storage};

    fn create_writer(storage: &MemoryStorage) -> IndexWriter {
        let storage: Arc<dyn Storage> = Arc::new(storage.clone());
        IndexWriter::new(
            Arc::new(NgramTokenizer::default()),
            Arc::new(ShardStore::new(
                Arc::clone(&storage),
                Arc::new(LeadingCharPartitioner),
                ShardLocking::None,
            )),
            Arc::new(DocStatsStore::new(Arc::clone(&storage))),
        )
        .with_document_store(Arc::new(DocumentStore::new(storage)))
    }

    fn shards(storage: &MemoryStorage) -> ShardStore {
        ShardStore::new(
            Arc::new(storage.clone()),
            Arc::new(LeadingCharPartitioner),
            ShardLocking::None,
        )
    }

    #[test]
    fn test_index_document() {
        let storage = MemoryStorage::new();
        let writer = create_writer(&storage);
        let doc = Document::builder().add_text("text", "Desk desk tps").build();

        let report = writer.index("email_1", &doc).unwrap();

        // desk x2 -> des, esk, desk each twice; tps once
        assert_eq!(report.total_terms, 7);
        assert_eq!(report.distinct_terms, 4);
        assert_eq!(report.shards_written, 3);

        let store = shards(&storage);
        assert_eq!(store.lookup("desk").unwrap(), vec![Posting::new("email_1", 2)]);
        assert_eq!(store.lookup("tps").unwrap(), vec![Posting::new("email_1", 1)]);

        let stats = DocStatsStore::new(Arc::new(storage.clone()));
        assert_eq!(stats.get("email_1").unwrap(), Some(7));

        let documents = DocumentStore::new(Arc::new(storage));
        assert_eq!(documents.load("email_1").unwrap(), Some(doc));
    }

    #[test]
    fn test_fields_are_combined() {
        let storage = MemoryStorage::new();
        let writer = create_writer(&storage);
        let doc = Document::builder()
            .add_text("title", "red")
            .add_text("body", "red pen")
            .build();

        let report = writer.index("doc", &doc).unwrap();
        assert_eq!(report.total_terms, 3);
        assert_eq!(
            shards(&storage).lookup("red").unwrap(),
            vec![Posting::new("doc", 2)]
        );
        // field names are not indexed
        assert!(shards(&storage).lookup("title").unwrap().is_empty());
        assert!(shards(&storage).lookup("tit").unwrap().is_empty());
    }

    #[test]
    fn test_empty_id_is_rejected_before_writing() {
        let storage = MemoryStorage::new();
        let writer = create_writer(&storage);
        let doc = Document::builder().add_text("text", "hello").build();

        let err = writer.index("", &doc).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(storage.file_count(), 0);
    }

    #[test]
    fn test_document_without_terms_records_zero() {
        let storage = MemoryStorage::new();
        let writer = create_writer(&storage);

        let report = writer.index("blank", &Document::new()).unwrap();
        assert_eq!(report.total_terms, 0);
        assert_eq!(report.shards_written, 0);

        let stats = DocStatsStore::new(Arc::new(storage.clone()));
        assert_eq!(stats.get("blank").unwrap(), Some(0));
        assert!(shards(&storage).shard_keys().unwrap().is_empty());
    }

    #[test]
    fn test_reindex_appends_postings() {
        let storage = MemoryStorage::new();
        let writer = create_writer(&storage);

        writer
            .index("a", &Document::builder().add_text("text", "red").build())
            .unwrap();
        writer
            .index("a", &Document::builder().add_text("text", "red pen").build())
            .unwrap();

        let store = shards(&storage);
        assert_eq!(
            store.lookup("red").unwrap(),
            vec![Posting::new("a", 1), Posting::new("a", 1)]
        );
        assert_eq!(store.lookup("pen").unwrap(), vec![Posting::new("a", 1)]);

        let stats = DocStatsStore::new(Arc::new(storage));
        assert_eq!(stats.get("a").unwrap(), Some(2));
    }

    #[test]
    fn test_storage_failure_surfaces() {
        let storage = MemoryStorage::new();
        storage.put_file("shard-r.json", b"not json");
        let writer = create_writer(&storage);

        let err = writer
            .index("a", &Document::builder().add_text("text", "red pen").build())
            .unwrap_err();
        assert!(err.is_storage());

        // shard "p" sorts before "r" and was already written
        assert_eq!(
            shards(&storage).lookup("pen").unwrap(),
            vec![Posting::new("a", 1)]
        );
        // stats are written last and never happened
        let stats = DocStatsStore::new(Arc::new(storage));
        assert_eq!(stats.get("a").unwrap(), None);
    }
}
