//! Per-document term totals used to normalize scores.
//!
//! All records live in one JSON object in `doc_stats.json`, mapping document
//! id to the number of terms emitted when the document was last indexed.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::error::{MicrosearchError, Result};
use crate::index::shard::ShardLocking;
use crate::storage::{Storage, read_optional, write_atomic};

/// Name of the stats file in storage.
pub const DOC_STATS_FILE: &str = "doc_stats.json";

/// Loaded document stats, document id to total term count.
pub type DocStats = BTreeMap<String, u64>;

/// Stores the total term count of every indexed document.
#[derive(Debug)]
pub struct DocStatsStore {
    storage: Arc<dyn Storage>,
    write_lock: Option<Mutex<()>>,
}

impl DocStatsStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        DocStatsStore {
            storage,
            write_lock: None,
        }
    }

    /// Serialize `record` calls when the index uses per-shard locking.
    pub fn with_locking(mut self, locking: ShardLocking) -> Self {
        self.write_lock = match locking {
            ShardLocking::None => None,
            ShardLocking::PerShard => Some(Mutex::new(())),
        };
        self
    }

    /// Load every record. A missing file means no documents.
    pub fn load_all(&self) -> Result<DocStats> {
        let Some(bytes) = read_optional(self.storage.as_ref(), DOC_STATS_FILE)? else {
            return Ok(DocStats::new());
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            MicrosearchError::storage(format!("Malformed document stats {DOC_STATS_FILE}: {e}"))
        })
    }

    /// Store `total_terms` for `doc_id`, replacing any earlier value.
    pub fn record(&self, doc_id: &str, total_terms: u64) -> Result<()> {
        let _guard = self.write_lock.as_ref().map(|l| l.lock());
        let mut stats = self.load_all()?;
        stats.insert(doc_id.to_string(), total_terms);

        let bytes = serde_json::to_vec(&stats)?;
        write_atomic(self.storage.as_ref(), DOC_STATS_FILE, &bytes)?;
        debug!("recorded {total_terms} terms for document {doc_id}");
        Ok(())
    }

    /// Total term count of `doc_id`, or `None` if it was never indexed.
    pub fn get(&self, doc_id: &str) -> Result<Option<u64>> {
        Ok(self.load_all()?.get(doc_id).copied())
    }

    /// Number of documents with a stats record.
    pub fn len(&self) -> Result<usize> {
        Ok(self.load_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
