//! Stored copies of indexed documents.
//!
//! Documents are spread over 256 bucket files (`docs-00.json` ..
//! `docs-ff.json`) chosen by a CRC32 of the id, so ids may contain any
//! characters without touching file names. Reindexing an id replaces its
//! stored fields.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::document::Document;
use crate::error::{MicrosearchError, Result};
use crate::index::shard::ShardLocking;
use crate::storage::{Storage, read_optional, write_atomic};

const BUCKETS: u32 = 256;

type Bucket = BTreeMap<String, Document>;

/// Persists the source fields of indexed documents.
#[derive(Debug)]
pub struct DocumentStore {
    storage: Arc<dyn Storage>,
    write_lock: Option<Mutex<()>>,
}

impl DocumentStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        DocumentStore {
            storage,
            write_lock: None,
        }
    }

    /// Serialize bucket rewrites when the index uses per-shard locking.
    pub fn with_locking(mut self, locking: ShardLocking) -> Self {
        self.write_lock = match locking {
            ShardLocking::None => None,
            ShardLocking::PerShard => Some(Mutex::new(())),
        };
        self
    }

    /// Bucket file holding `doc_id`.
    pub fn bucket_name(doc_id: &str) -> String {
        format!("docs-{:02x}.json", crc32fast::hash(doc_id.as_bytes()) % BUCKETS)
    }

    fn load_bucket(&self, name: &str) -> Result<Bucket> {
        let Some(bytes) = read_optional(self.storage.as_ref(), name)? else {
            return Ok(Bucket::new());
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| MicrosearchError::storage(format!("Malformed document bucket {name}: {e}")))
    }

    /// Store `document` under `doc_id`, replacing any earlier copy.
    pub fn save(&self, doc_id: &str, document: &Document) -> Result<()> {
        let _guard = self.write_lock.as_ref().map(|l| l.lock());
        let name = Self::bucket_name(doc_id);
        let mut bucket = self.load_bucket(&name)?;
        bucket.insert(doc_id.to_string(), document.clone());

        let bytes = serde_json::to_vec(&bucket)?;
        write_atomic(self.storage.as_ref(), &name, &bytes)?;
        debug!("stored document {doc_id} in {name}");
        Ok(())
    }

    /// The stored copy of `doc_id`, if any.
    pub fn load(&self, doc_id: &str) -> Result<Option<Document>> {
        let mut bucket = self.load_bucket(&Self::bucket_name(doc_id))?;
        Ok(bucket.remove(doc_id))
    }
}
