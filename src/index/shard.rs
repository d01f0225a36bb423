//! Sharded on-disk postings store.
//!
//! Terms are partitioned into shards by a [`ShardPartitioner`]. Each shard is
//! one JSON file (`shard-<key>.json`) holding a sorted object from term to its
//! postings list. Every write loads the whole shard, appends, and atomically
//! replaces the file, so a shard is never observed half written. A write that
//! touches several shards is not transactional: an error part way through
//! leaves the shards already written in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, trace};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{MicrosearchError, Result};
use crate::index::partition::ShardPartitioner;
use crate::storage::{Storage, read_optional, write_atomic};

const SHARD_PREFIX: &str = "shard-";
const SHARD_SUFFIX: &str = ".json";

/// One document's occurrence count for a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The document the term occurred in.
    pub doc_id: String,
    /// Occurrences recorded by one indexing call.
    pub frequency: u32,
}

impl Posting {
    pub fn new<S: Into<String>>(doc_id: S, frequency: u32) -> Self {
        Posting {
            doc_id: doc_id.into(),
            frequency,
        }
    }
}

/// The in-memory form of one shard file.
pub type ShardData = BTreeMap<String, Vec<Posting>>;

/// How concurrent writers to the same shard are coordinated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShardLocking {
    /// No coordination. Two writers merging into the same shard at once both
    /// read the old content and the later replacement wins, dropping the
    /// other's postings.
    #[default]
    None,
    /// Serialize read-merge-write cycles per shard key within this process.
    PerShard,
}

/// Persists and retrieves term postings, one file per shard.
#[derive(Debug)]
pub struct ShardStore {
    storage: Arc<dyn Storage>,
    partitioner: Arc<dyn ShardPartitioner>,
    locking: ShardLocking,
    locks: Mutex<AHashMap<String, Arc<Mutex<()>>>>,
}

impl ShardStore {
    /// Create a shard store over `storage`.
    pub fn new(
        storage: Arc<dyn Storage>,
        partitioner: Arc<dyn ShardPartitioner>,
        locking: ShardLocking,
    ) -> Self {
        ShardStore {
            storage,
            partitioner,
            locking,
            locks: Mutex::new(AHashMap::new()),
        }
    }

    /// The shard key `term` resolves to.
    pub fn shard_key(&self, term: &str) -> String {
        self.partitioner.shard_key(term)
    }

    /// File name of the shard with the given key.
    pub fn file_name(key: &str) -> String {
        format!("{SHARD_PREFIX}{key}{SHARD_SUFFIX}")
    }

    pub fn locking(&self) -> ShardLocking {
        self.locking
    }

    fn shard_lock(&self, key: &str) -> Option<Arc<Mutex<()>>> {
        match self.locking {
            ShardLocking::None => None,
            ShardLocking::PerShard => {
                let mut locks = self.locks.lock();
                Some(Arc::clone(locks.entry(key.to_string()).or_default()))
            }
        }
    }

    /// Load a whole shard. A shard that was never written is empty; a shard
    /// file that cannot be read or parsed is an error.
    pub fn load_shard(&self, key: &str) -> Result<ShardData> {
        let name = Self::file_name(key);
        let Some(bytes) = read_optional(self.storage.as_ref(), &name)? else {
            trace!("shard {name} does not exist yet");
            return Ok(ShardData::new());
        };

        let data: ShardData = serde_json::from_slice(&bytes)
            .map_err(|e| MicrosearchError::storage(format!("Malformed shard {name}: {e}")))?;
        debug!("loaded shard {name} with {} terms", data.len());
        Ok(data)
    }

    fn write_shard(&self, key: &str, data: &ShardData) -> Result<()> {
        let name = Self::file_name(key);
        let bytes = serde_json::to_vec(data)?;
        write_atomic(self.storage.as_ref(), &name, &bytes)?;
        debug!("wrote shard {name} with {} terms", data.len());
        Ok(())
    }

    /// Append a posting for `doc_id` under `term`.
    ///
    /// Earlier postings for the same document are kept; nothing is replaced.
    pub fn merge_postings(&self, term: &str, doc_id: &str, frequency: u32) -> Result<()> {
        let key = self.shard_key(term);
        let lock = self.shard_lock(&key);
        let _guard = lock.as_ref().map(|l| l.lock());

        let mut data = self.load_shard(&key)?;
        data.entry(term.to_string())
            .or_default()
            .push(Posting::new(doc_id, frequency));
        self.write_shard(&key, &data)
    }

    /// Append postings for `doc_id` under many terms.
    ///
    /// Equivalent to calling [`merge_postings`](Self::merge_postings) once per
    /// term, but each touched shard is read and replaced only once. Shards are
    /// written in key order; if one fails, the ones before it stay written.
    /// Returns the number of shards written.
    pub fn merge_batch<'a, I>(&self, doc_id: &str, terms: I) -> Result<usize>
    where
        I: IntoIterator<Item = (&'a str, u32)>,
    {
        let mut by_shard: BTreeMap<String, Vec<(&'a str, u32)>> = BTreeMap::new();
        for (term, frequency) in terms {
            by_shard
                .entry(self.shard_key(term))
                .or_default()
                .push((term, frequency));
        }

        for (key, terms) in &by_shard {
            let lock = self.shard_lock(key);
            let _guard = lock.as_ref().map(|l| l.lock());

            let mut data = self.load_shard(key)?;
            for (term, frequency) in terms {
                data.entry(term.to_string())
                    .or_default()
                    .push(Posting::new(doc_id, *frequency));
            }
            self.write_shard(key, &data)?;
        }

        Ok(by_shard.len())
    }

    /// Postings recorded for exactly `term`, empty if none.
    pub fn lookup(&self, term: &str) -> Result<Vec<Posting>> {
        let mut data = self.load_shard(&self.shard_key(term))?;
        Ok(data.remove(term).unwrap_or_default())
    }

    /// Postings for several terms, reading each shard once.
    ///
    /// Every requested term appears in the result, with an empty list when it
    /// has no postings.
    pub fn lookup_many<'a>(&self, terms: &[&'a str]) -> Result<BTreeMap<&'a str, Vec<Posting>>> {
        let mut by_shard: BTreeMap<String, Vec<&'a str>> = BTreeMap::new();
        for term in terms {
            by_shard.entry(self.shard_key(term)).or_default().push(*term);
        }

        let mut results = BTreeMap::new();
        for (key, terms) in by_shard {
            let mut data = self.load_shard(&key)?;
            for term in terms {
                results.insert(term, data.remove(term).unwrap_or_default());
            }
        }
        Ok(results)
    }

    /// Keys of all shards that exist in storage, sorted.
    pub fn shard_keys(&self) -> Result<Vec<String>> {
        Ok(self
            .storage
            .list_files()?
            .into_iter()
            .filter_map(|name| {
                name.strip_prefix(SHARD_PREFIX)
                    .and_then(|rest| rest.strip_suffix(SHARD_SUFFIX))
                    .map(str::to_string)
            })
            .collect())
    }
}
