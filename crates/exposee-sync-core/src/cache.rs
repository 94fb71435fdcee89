//! Validator cache keyed by [`RequestIdentity`].
//!
//! The client records, per request identity, the cache validator (`ETag`) of
//! the last decoded response together with the decoded batch. A later fetch
//! whose validator matches is reported as "unchanged" without decoding.
//!
//! # Concurrency
//!
//! A single cache instance may be shared by concurrent fetches. Every
//! implementation must serialise its own reads and writes; callers never
//! hold a lock across a `lookup`/`store` pair. The "unchanged" decision is
//! therefore taken on a snapshot and the last writer for an identity wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use crate::decode::ExposedBatch;
use crate::request::RequestIdentity;

/// Opaque freshness token taken from the `ETag` response header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheValidator(String);

impl CacheValidator {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last decoded response for one request identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Validator of the response, `None` when the server sent no `ETag`.
    pub validator: Option<CacheValidator>,
    /// Batch decoded from that response.
    pub batch: ExposedBatch,
}

impl CacheEntry {
    /// Returns `true` when `fresh` proves the cached batch is still current.
    ///
    /// A missing validator on either side never matches.
    pub fn matches(&self, fresh: Option<&CacheValidator>) -> bool {
        matches!((self.validator.as_ref(), fresh), (Some(cached), Some(fresh)) if cached == fresh)
    }
}

/// Storage for validator/batch pairs.
pub trait ResponseCache: Send + Sync {
    /// Returns the entry stored for `identity`, if any.
    fn lookup(&self, identity: &RequestIdentity) -> Option<CacheEntry>;
    /// Replaces the entry stored for `identity`.
    fn store(&self, identity: &RequestIdentity, entry: CacheEntry);
}

/// Process-local cache guarded by one read/write lock.
#[derive(Debug, Default)]
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<RequestIdentity, CacheEntry>>,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResponseCache for InMemoryResponseCache {
    fn lookup(&self, identity: &RequestIdentity) -> Option<CacheEntry> {
        // Inserts replace whole entries, so a poisoned map is still consistent.
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(identity).cloned()
    }

    fn store(&self, identity: &RequestIdentity, entry: CacheEntry) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(identity.clone(), entry);
    }
}

/// Cache that never hits; every fetch decodes the fresh body.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopResponseCache;

impl ResponseCache for NoopResponseCache {
    fn lookup(&self, _identity: &RequestIdentity) -> Option<CacheEntry> {
        None
    }

    fn store(&self, _identity: &RequestIdentity, _entry: CacheEntry) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApplicationDescriptor;
    use crate::decode::ExposedRecord;
    use crate::request::BatchTimestamp;
    use reqwest::Url;
    use std::sync::Arc;
    use time::OffsetDateTime;

    fn identity(millis: i64) -> RequestIdentity {
        let descriptor = ApplicationDescriptor {
            app_id: "ch.xy".to_string(),
            description: "XY".to_string(),
            jwt_public_key: None,
            bucket_base_url: Url::parse("https://xy.ch").unwrap(),
            report_base_url: Url::parse("https://xy.ch").unwrap(),
            contact: "xy".to_string(),
        };
        RequestIdentity::for_batch(&descriptor, BatchTimestamp::from_millis(millis))
    }

    fn entry(validator: &str, keys: usize) -> CacheEntry {
        let records = (0..keys)
            .map(|i| ExposedRecord::new(vec![i as u8; 32], OffsetDateTime::UNIX_EPOCH))
            .collect();
        CacheEntry {
            validator: Some(CacheValidator::new(validator)),
            batch: ExposedBatch::new(records),
        }
    }

    #[test]
    fn in_memory_cache_stores_per_identity() {
        let cache = InMemoryResponseCache::new();
        assert!(cache.lookup(&identity(1)).is_none());

        cache.store(&identity(1), entry("HASH", 1));
        cache.store(&identity(2), entry("OTHER", 0));

        assert_eq!(cache.lookup(&identity(1)), Some(entry("HASH", 1)));
        assert_eq!(cache.lookup(&identity(2)), Some(entry("OTHER", 0)));
        assert!(cache.lookup(&identity(3)).is_none());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn in_memory_cache_overwrites_entries() {
        let cache = InMemoryResponseCache::new();
        cache.store(&identity(1), entry("HASHDIFF", 3));
        cache.store(&identity(1), entry("HASH", 1));
        assert_eq!(cache.lookup(&identity(1)), Some(entry("HASH", 1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopResponseCache;
        cache.store(&identity(1), entry("HASH", 1));
        assert!(cache.lookup(&identity(1)).is_none());
    }

    #[test]
    fn entry_matching_requires_equal_validators() {
        let cached = entry("HASH", 0);
        assert!(cached.matches(Some(&CacheValidator::new("HASH"))));
        assert!(!cached.matches(Some(&CacheValidator::new("HASHDIFF"))));
        assert!(!cached.matches(None));

        let without_validator = CacheEntry {
            validator: None,
            batch: ExposedBatch::default(),
        };
        assert!(!without_validator.matches(None));
    }

    #[test]
    fn in_memory_cache_is_shareable_across_threads() {
        let cache = Arc::new(InMemoryResponseCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for round in 0..50 {
                        cache.store(&identity(i), entry(&format!("v{round}"), 1));
                        assert!(cache.lookup(&identity(i)).is_some());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
        assert_eq!(
            cache.lookup(&identity(3)).unwrap().validator,
            Some(CacheValidator::new("v49"))
        );
    }
}
