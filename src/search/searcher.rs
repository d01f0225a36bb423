//! The query path: tokenize, fetch postings, score, rank.

use std::cmp::Ordering;
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, trace};

use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;
use crate::index::doc_stats::DocStatsStore;
use crate::index::doc_store::DocumentStore;
use crate::index::shard::ShardStore;
use crate::search::request::{SearchHit, SearchRequest, SearchResults};

/// Answers free-text queries against the shard and stats stores.
///
/// A document's score is the sum, over the distinct query terms it contains,
/// of each posting's frequency divided by the document's total term count.
/// There is no inverse document frequency component.
#[derive(Debug)]
pub struct Searcher {
    tokenizer: Arc<dyn Tokenizer>,
    shards: Arc<ShardStore>,
    stats: Arc<DocStatsStore>,
    documents: Option<Arc<DocumentStore>>,
}

impl Searcher {
    pub fn new(
        tokenizer: Arc<dyn Tokenizer>,
        shards: Arc<ShardStore>,
        stats: Arc<DocStatsStore>,
    ) -> Self {
        Searcher {
            tokenizer,
            shards,
            stats,
            documents: None,
        }
    }

    /// Source for documents attached to hits.
    pub fn with_document_store(mut self, documents: Arc<DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Every matching document, best first.
    ///
    /// Ties are broken by ascending document id, so the order is total and
    /// repeatable. Empty query text and unknown terms produce no hits.
    ///
    /// # Errors
    ///
    /// A storage error if a shard or the stats file cannot be read. Partial
    /// results are never returned.
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let counts = self.tokenizer.tokenize(query);
        if counts.is_empty() {
            return Ok(Vec::new());
        }

        let terms = counts.terms();
        let postings = self.shards.lookup_many(&terms)?;
        if postings.values().all(Vec::is_empty) {
            debug!("query {query:?}: no postings for {} terms", terms.len());
            return Ok(Vec::new());
        }

        let stats = self.stats.load_all()?;
        let mut scores: AHashMap<&str, f64> = AHashMap::new();

        for (term, postings) in &postings {
            for posting in postings {
                match stats.get(&posting.doc_id) {
                    Some(&total) if total > 0 => {
                        *scores.entry(posting.doc_id.as_str()).or_insert(0.0) +=
                            posting.frequency as f64 / total as f64;
                    }
                    _ => trace!(
                        "skipping posting for {} under {term:?}: no document stats",
                        posting.doc_id
                    ),
                }
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .filter(|&(_, score)| score > 0.0)
            .map(|(doc_id, score)| SearchHit::new(doc_id, score))
            .collect();
        hits.sort_by(compare_hits);

        debug!(
            "query {query:?}: {} terms matched {} documents",
            terms.len(),
            hits.len()
        );
        Ok(hits)
    }

    /// One page of the ranking produced by [`search`](Self::search).
    pub fn search_with(&self, request: &SearchRequest) -> Result<SearchResults> {
        let hits = self.search(&request.query)?;
        let total_hits = hits.len();

        let mut page: Vec<SearchHit> = hits
            .into_iter()
            .skip(request.offset)
            .take(request.limit)
            .collect();

        if request.load_documents {
            if let Some(documents) = &self.documents {
                for hit in &mut page {
                    hit.document = documents.load(&hit.doc_id)?;
                }
            }
        }

        Ok(SearchResults {
            total_hits,
            hits: page,
        })
    }
}

/// Score descending, then document id ascending.
fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.doc_id.cmp(&b.doc_id))
}
