use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Bounded in-memory answer cache with least-recently-used eviction.
///
/// Both `get` and `set` refresh an entry's recency. Not internally
/// synchronized: concurrent callers must serialize access (the assistant
/// holds it behind a mutex). Process-lifetime only, never persisted.
#[derive(Debug)]
pub struct ResponseCache {
    max_size: usize,
    entries: HashMap<String, CacheEntry>,
    clock: u64,
}

#[derive(Debug)]
struct CacheEntry {
    value: String,
    last_access: u64,
}

impl ResponseCache {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            entries: HashMap::new(),
            clock: 0,
        }
    }

    pub fn get(&mut self, key: &str) -> Option<&String> {
        self.clock += 1;
        let clock = self.clock;
        self.entries.get_mut(key).map(|entry| {
            entry.last_access = clock;
            &entry.value
        })
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.clock += 1;

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_size {
            self.evict_least_recent();
        }

        self.entries.insert(
            key,
            CacheEntry {
                value: value.into(),
                last_access: self.clock,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

/// Stable fingerprint for a query. The raw text is trimmed and lowercased
/// before hashing so that two queries differing only in casing or
/// surrounding whitespace share one cache entry.
pub fn query_cache_key(query: &str) -> String {
    let normalized = query.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("query_{:x}", hasher.finalize())
}
