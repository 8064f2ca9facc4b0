use crate::core::cache::{Cache, CacheEntry, DEFAULT_TTL};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory cache backed by a HashMap. Used in tests and whenever the
/// persistent store cannot be opened.
pub struct MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }
}

impl<V> Default for MemoryCache<V>
where
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> Cache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let mut cache = self.inner.lock().await;
        if let Some(entry) = cache.get(key) {
            if entry.is_expired(self.ttl, Utc::now()) {
                debug!("Cache entry expired for key: {}", key);
                cache.remove(key);
                return None;
            }
            debug!("Cache HIT for key: {}", key);
            return Some(entry.data.clone());
        }
        debug!("Cache MISS for key: {}", key);
        None
    }

    async fn put(&self, key: &str, value: V) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT for key: {}", key);
        cache.insert(key.to_string(), CacheEntry::new(value, Utc::now()));
    }

    async fn evict(&self, key: &str) {
        let mut cache = self.inner.lock().await;
        cache.remove(key);
        debug!("Cache EVICT for key: {}", key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_cache_get_put() {
        let cache = MemoryCache::<i32>::new();

        // Initially, cache is empty
        assert!(cache.get("key1").await.is_none());

        cache.put("key1", 123).await;
        assert_eq!(cache.get("key1").await, Some(123));

        // Get a non-existent key
        assert!(cache.get("key2").await.is_none());
    }

    #[tokio::test]
    async fn test_cache_overwrite() {
        let cache = MemoryCache::<i32>::new();

        cache.put("key1", 123).await;
        cache.put("key1", 456).await;
        assert_eq!(cache.get("key1").await, Some(456));
    }

    #[tokio::test]
    async fn test_cache_ttl_expiration() {
        let cache = MemoryCache::<i32>::with_ttl(Duration::from_millis(10));

        cache.put("key1", 123).await;
        assert_eq!(cache.get("key1").await, Some(123));

        // Wait for TTL expiration; the expired entry is also evicted
        sleep(Duration::from_millis(20)).await;
        assert!(cache.get("key1").await.is_none());
        assert!(cache.inner.lock().await.get("key1").is_none());
    }

    #[tokio::test]
    async fn test_cache_evict() {
        let cache = MemoryCache::<i32>::new();

        cache.put("key1", 123).await;
        assert_eq!(cache.get("key1").await, Some(123));

        cache.evict("key1").await;
        assert!(cache.get("key1").await.is_none());
    }
}
