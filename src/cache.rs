//! Render identity and byte cache storage.
//!
//! A render is identified by a [`CacheKey`] derived from every input that
//! affects its bytes. Stores implement [`CacheStore`]; the generator only ever
//! treats them as an accelerator, so a failing store degrades to recomputing.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use bytes::Bytes;
use lru::LruCache;
use md5::{Digest as _, Md5};
use thiserror::Error;
use tracing::warn;

use crate::options::RenderOptions;

const SOURCE: &str = "cache::store";
const DEFAULT_CAPACITY: usize = 1024;

// ============================================================================
// CacheKey
// ============================================================================

/// Identity of a cached render.
///
/// `prefix` followed by the MD5 hex of `seed ++ size ++ format ++ background`.
/// Fields are joined without a separator, so `("a1", 23, ..)` and
/// `("a", 123, ..)` share a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(prefix: &str, seed: &str, size: u32, format: &str, background: &str) -> Self {
        let mut hasher = Md5::new();
        hasher.update(seed.as_bytes());
        hasher.update(size.to_string().as_bytes());
        hasher.update(format.as_bytes());
        hasher.update(background.as_bytes());
        Self(format!("{prefix}{}", hex::encode(hasher.finalize())))
    }

    /// Key for `seed` rendered with `options`.
    pub fn for_render(prefix: &str, seed: &str, options: &RenderOptions) -> Self {
        Self::new(
            prefix,
            seed,
            options.size(),
            options.format().as_str(),
            options.background(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// CacheStore
// ============================================================================

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// A shared key → bytes store with per-entry TTL.
///
/// Implementations must tolerate concurrent `get`/`put` calls. Writing the
/// same key twice with identical bytes must be harmless.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, CacheError>;

    fn put(&self, key: &CacheKey, value: Bytes, ttl: Duration) -> Result<(), CacheError>;
}

/// A store that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheStore;

impl CacheStore for NoopCacheStore {
    fn get(&self, _key: &CacheKey) -> Result<Option<Bytes>, CacheError> {
        Ok(None)
    }

    fn put(&self, _key: &CacheKey, _value: Bytes, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

struct Entry {
    value: Bytes,
    expires_at: Instant,
}

/// In-process LRU store.
///
/// Expired entries read as absent and are dropped on access.
pub struct MemoryCacheStore {
    entries: Mutex<LruCache<CacheKey, Entry>>,
}

impl MemoryCacheStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        lock(&self.entries, "clear").clear();
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<Bytes> {
        let mut entries = lock(&self.entries, "get");
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &CacheKey) -> Result<Option<Bytes>, CacheError> {
        Ok(self.get_at(key, Instant::now()))
    }

    fn put(&self, key: &CacheKey, value: Bytes, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl;
        lock(&self.entries, "put").put(key.clone(), Entry { value, expires_at });
        Ok(())
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, op: &'static str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = SOURCE,
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                "Recovered from poisoned cache lock"
            );
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::format::ImageFormat;
    use std::sync::Arc;
    use std::thread;

    const TTL: Duration = Duration::from_secs(3600);

    fn key(seed: &str) -> CacheKey {
        CacheKey::new("identicon:", seed, 250, "png", "ffffff")
    }

    #[test]
    fn key_matches_md5_of_concatenation() {
        assert_eq!(
            key("test@example.com").as_str(),
            "identicon:768f5262f9af3510bf195034defd0b10"
        );
    }

    #[test]
    fn key_depends_on_every_field() {
        let base = CacheKey::new("p:", "alice", 250, "png", "ffffff");
        assert_eq!(base, CacheKey::new("p:", "alice", 250, "png", "ffffff"));
        assert_ne!(base, CacheKey::new("p:", "bob", 250, "png", "ffffff"));
        assert_ne!(base, CacheKey::new("p:", "alice", 251, "png", "ffffff"));
        assert_ne!(base, CacheKey::new("p:", "alice", 250, "gif", "ffffff"));
        assert_ne!(base, CacheKey::new("p:", "alice", 250, "png", "000000"));
    }

    #[test]
    fn fields_are_not_separated() {
        assert_eq!(
            CacheKey::new("p:", "a1", 23, "png", "ffffff"),
            CacheKey::new("p:", "a", 123, "png", "ffffff")
        );
    }

    #[test]
    fn key_for_render_uses_normalized_options() {
        let config = GeneratorConfig::default();
        let options = RenderOptions::defaults(&config)
            .with_format(ImageFormat::Gif)
            .with_background("#ABC")
            .unwrap();
        assert_eq!(
            CacheKey::for_render("identicon:", "x", &options),
            CacheKey::new("identicon:", "x", 250, "gif", "aabbcc")
        );
    }

    #[test]
    fn background_case_shares_a_key() {
        let config = GeneratorConfig::default();
        let upper = RenderOptions::defaults(&config)
            .with_background("#FFFFFF")
            .unwrap();
        let lower = RenderOptions::defaults(&config)
            .with_background("ffffff")
            .unwrap();
        assert_eq!(
            CacheKey::for_render("identicon:", "x", &upper),
            CacheKey::for_render("identicon:", "x", &lower)
        );
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryCacheStore::new(4);
        assert!(store.get(&key("a")).unwrap().is_none());

        store.put(&key("a"), Bytes::from_static(b"png"), TTL).unwrap();
        assert_eq!(store.get(&key("a")).unwrap().unwrap(), Bytes::from_static(b"png"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_store_expires_entries() {
        let store = MemoryCacheStore::new(4);
        store.put(&key("a"), Bytes::from_static(b"png"), Duration::from_secs(10)).unwrap();

        let later = Instant::now() + Duration::from_secs(11);
        assert!(store.get_at(&key("a"), later).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn memory_store_evicts_least_recent() {
        let store = MemoryCacheStore::new(2);
        store.put(&key("a"), Bytes::from_static(b"a"), TTL).unwrap();
        store.put(&key("b"), Bytes::from_static(b"b"), TTL).unwrap();
        store.get(&key("a")).unwrap();
        store.put(&key("c"), Bytes::from_static(b"c"), TTL).unwrap();

        assert!(store.get(&key("a")).unwrap().is_some());
        assert!(store.get(&key("b")).unwrap().is_none());
        assert!(store.get(&key("c")).unwrap().is_some());
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let store = MemoryCacheStore::new(0);
        store.put(&key("a"), Bytes::from_static(b"a"), TTL).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn noop_store_never_hits() {
        let store = NoopCacheStore;
        store.put(&key("a"), Bytes::from_static(b"a"), TTL).unwrap();
        assert!(store.get(&key("a")).unwrap().is_none());
    }

    #[test]
    fn concurrent_puts_of_same_key() {
        let store = Arc::new(MemoryCacheStore::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.put(&key("same"), Bytes::from_static(b"bytes"), TTL).unwrap();
                    store.get(&key("same")).unwrap()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), Bytes::from_static(b"bytes"));
        }
        assert_eq!(store.len(), 1);
    }
}
