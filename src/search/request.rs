//! Search request and result types.

use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Default page size for [`SearchRequest`].
pub const DEFAULT_LIMIT: usize = 20;

/// A paged search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free query text, tokenized like document text.
    pub query: String,
    /// Number of ranked hits to skip.
    #[serde(default)]
    pub offset: usize,
    /// Maximum number of hits to return.
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Attach the stored document to every returned hit.
    #[serde(default)]
    pub load_documents: bool,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl SearchRequest {
    pub fn new<S: Into<String>>(query: S) -> Self {
        SearchRequest {
            query: query.into(),
            offset: 0,
            limit: DEFAULT_LIMIT,
            load_documents: false,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_documents(mut self, load_documents: bool) -> Self {
        self.load_documents = load_documents;
        self
    }
}

/// One ranked document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: String,
    /// Sum over matched query terms of term frequency divided by the
    /// document's total term count.
    pub score: f64,
    /// The stored document, when requested and available.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub document: Option<Document>,
}

impl SearchHit {
    pub fn new<S: Into<String>>(doc_id: S, score: f64) -> Self {
        SearchHit {
            doc_id: doc_id.into(),
            score,
            document: None,
        }
    }
}

/// One page of a ranked result list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    /// Number of matching documents before paging.
    pub total_hits: usize,
    pub hits: Vec<SearchHit>,
}
