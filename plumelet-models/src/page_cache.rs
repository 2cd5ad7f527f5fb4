use crate::CONFIG;
use moka::sync::Cache;
use std::time::Duration;
use tracing::debug;

/// Single-slot, time-expiring store for the rendered home feed.
///
/// The whole store holds one configured key. Entries live for the
/// configured TTL and are recomputed by the caller on the first request
/// after expiry. Overlapping requests may read and write the slot
/// concurrently; serving a stale rendering inside the TTL window is the
/// intended contract, not a race to fix. There is deliberately no
/// eviction policy and no size bound.
pub struct PageCache {
    inner: Cache<String, String>,
    key: String,
}

impl PageCache {
    pub fn new(key: &str, ttl: Duration) -> PageCache {
        PageCache {
            inner: Cache::builder().time_to_live(ttl).build(),
            key: key.to_owned(),
        }
    }

    /// A cache configured from `CACHE_KEY` and `CACHE_TTL`.
    pub fn from_config() -> PageCache {
        PageCache::new(&CONFIG.home_cache.key, CONFIG.home_cache.ttl)
    }

    pub fn get(&self) -> Option<String> {
        let hit = self.inner.get(&self.key);
        debug!(
            key = self.key.as_str(),
            hit = hit.is_some(),
            "home feed cache lookup"
        );
        hit
    }

    pub fn insert(&self, body: String) {
        self.inner.insert(self.key.clone(), body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn serves_within_ttl() {
        let cache = PageCache::new("home-feed", Duration::from_secs(20));
        assert_eq!(None, cache.get());
        cache.insert("<p>rendered</p>".to_owned());
        assert_eq!(Some("<p>rendered</p>".to_owned()), cache.get());
    }

    #[test]
    fn expires_after_ttl() {
        let cache = PageCache::new("home-feed", Duration::from_millis(50));
        cache.insert("stale".to_owned());
        assert_eq!(Some("stale".to_owned()), cache.get());
        sleep(Duration::from_millis(80));
        assert_eq!(None, cache.get());
    }

    #[test]
    fn reinsert_overwrites_the_slot() {
        let cache = PageCache::new("home-feed", Duration::from_secs(20));
        cache.insert("old".to_owned());
        cache.insert("new".to_owned());
        assert_eq!(Some("new".to_owned()), cache.get());
    }
}
