//! Thread-safe flyweight factory.
//!
//! DashMap shards the map behind many small locks. The entry API keeps the
//! shard locked between the existence check and the insert, so concurrent
//! misses on one key still produce exactly one record.

use crate::factory::{render_listing, CacheStats, Lookup};
use crate::key::CacheKey;
use crate::record::{Flyweight, Intrinsic, SharedRecord};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rayon::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct SharedFlyweightFactory<T> {
    records: DashMap<CacheKey, SharedRecord<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Intrinsic> Default for SharedFlyweightFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Intrinsic> SharedFlyweightFactory<T> {
    pub fn new() -> Self {
        SharedFlyweightFactory {
            records: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn get_or_create(&self, intrinsic: impl Into<T>) -> SharedRecord<T> {
        self.lookup(intrinsic).0
    }

    pub fn lookup(&self, intrinsic: impl Into<T>) -> (SharedRecord<T>, Lookup) {
        let (record, outcome) = self.resolve(intrinsic.into());
        match outcome {
            Lookup::Hit => self.hits.fetch_add(1, Ordering::Relaxed),
            Lookup::Miss => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        (record, outcome)
    }

    fn resolve(&self, intrinsic: T) -> (SharedRecord<T>, Lookup) {
        let key = intrinsic.cache_key();
        match self.records.entry(key) {
            Entry::Occupied(entry) => {
                debug!(key = %entry.key(), "reusing existing flyweight");
                (Arc::clone(entry.get()), Lookup::Hit)
            }
            Entry::Vacant(entry) => {
                debug!(key = %entry.key(), "no flyweight for key, creating one");
                let record = Arc::new(Flyweight::with_key(entry.key().clone(), intrinsic));
                entry.insert(Arc::clone(&record));
                (record, Lookup::Miss)
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<SharedRecord<T>> {
        self.records.get(key).map(|entry| Arc::clone(entry.value()))
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn list_keys(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|entry| entry.key().as_str().to_owned())
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    pub fn listing(&self) -> String {
        render_listing(self.list_keys())
    }
}

impl<T> SharedFlyweightFactory<T>
where
    T: Intrinsic + Send + Sync,
{
    /// Seeds `states` in parallel. Like the single-threaded seeding this is
    /// not counted as lookups.
    pub fn extend_par<S>(&self, states: Vec<S>)
    where
        S: Into<T> + Send,
    {
        states.into_par_iter().for_each(|state| {
            self.resolve(state.into());
        });
        info!(records = self.count(), "seeded shared flyweight factory");
    }
}
