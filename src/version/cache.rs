//! Short-lived in-memory cache of retrieved package information
//!
//! Each tracker owns exactly one cache; entries are keyed by
//! `repository:branch:path`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::version::types::PackageInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub info: PackageInfo,
    pub fetched_at: DateTime<Utc>,
}

pub struct VersionCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
}

impl VersionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn cache_key(repository: &str, branch: &str, path: &str) -> String {
        format!("{}:{}:{}", repository, branch, path)
    }

    // Entries are plain values, so a panic while holding the lock cannot
    // leave one half-written.
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the entry for `key` if it is younger than the TTL at `now`
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        let entries = self.lock_entries();
        let entry = entries.get(key)?;

        let age = now - entry.fetched_at;
        if age < self.ttl {
            Some(entry.clone())
        } else {
            debug!("Cache entry {} is stale (age {}s)", key, age.num_seconds());
            None
        }
    }

    pub fn insert(&self, key: String, info: PackageInfo, fetched_at: DateTime<Utc>) {
        self.lock_entries()
            .insert(key, CacheEntry { info, fetched_at });
    }

    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        self.lock_entries().remove(key)
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
