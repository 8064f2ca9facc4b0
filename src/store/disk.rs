use crate::core::cache::{Cache, CacheEntry, DEFAULT_TTL};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Serialize, de::DeserializeOwned};
use std::marker::PhantomData;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Persistent cache backed by a fjall partition, surviving across runs the
/// way the original kept chart payloads in browser storage.
pub struct DiskCache<V>
where
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    // Keyspace must outlive the partition handle.
    _keyspace: Keyspace,
    partition: PartitionHandle,
    ttl: Duration,
    _marker: PhantomData<V>,
}

impl<V> DiskCache<V>
where
    V: Clone + Send + Sync + Serialize + DeserializeOwned,
{
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_ttl(path, DEFAULT_TTL)
    }

    pub fn open_with_ttl(path: &Path, ttl: Duration) -> Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = Config::new(path.join("cache")).open()?;
        let partition = keyspace.open_partition("series", PartitionCreateOptions::default())?;
        Ok(Self {
            _keyspace: keyspace,
            partition,
            ttl,
            _marker: PhantomData,
        })
    }
}

#[async_trait]
impl<V> Cache<V> for DiskCache<V>
where
    V: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let res: Result<Option<V>> = (|| {
            if let Some(bytes) = self.partition.get(key)? {
                let entry: CacheEntry<V> = serde_json::from_slice(&bytes)?;
                if entry.is_expired(self.ttl, Utc::now()) {
                    debug!("Cache entry expired for key: {}", key);
                    self.partition.remove(key)?;
                    return Ok(None);
                }
                debug!("Cache HIT for key: {}", key);
                return Ok(Some(entry.data));
            }
            debug!("Cache MISS for key: {}", key);
            Ok(None)
        })();

        match res {
            Ok(val) => val,
            Err(e) => {
                debug!("DiskCache get error: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &str, value: V) {
        let res: Result<()> = (|| {
            let entry = CacheEntry::new(value, Utc::now());
            self.partition.insert(key, serde_json::to_vec(&entry)?)?;
            debug!("Cache PUT for key: {}", key);
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCache put error: {}", e);
        }
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.partition.remove(key) {
            debug!("DiskCache evict error: {}", e);
        }
    }
}
