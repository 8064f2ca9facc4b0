//! Keyed TTL cache abstraction.
//!
//! Implementations live in the `store` module: an in-memory map for tests
//! and ephemeral runs, and a fjall-backed disk store for persistence across
//! sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fixed expiry for fetched chart payloads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache key for one symbol over one window, millisecond endpoints.
pub fn series_cache_key(symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    format!(
        "finance_data_{}_{}_{}",
        symbol,
        start.timestamp_millis(),
        end.timestamp_millis()
    )
}

/// A stored payload with its creation time. Expiry is measured from
/// creation, not last access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<V> {
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
    pub data: V,
}

impl<V> CacheEntry<V> {
    pub fn new(data: V, now: DateTime<Utc>) -> Self {
        Self {
            timestamp: now.timestamp_millis(),
            data,
        }
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - self.timestamp > ttl.as_millis() as i64
    }
}

/// Injectable keyed store. Each implementation carries a fixed TTL measured
/// from entry creation; expired entries are evicted on read.
#[async_trait]
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V>;
    async fn put(&self, key: &str, value: V);
    async fn evict(&self, key: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_series_cache_key_format() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 8, 15, 0, 0, 0).unwrap();

        assert_eq!(
            series_cache_key("SPY", start, end),
            format!(
                "finance_data_SPY_{}_{}",
                start.timestamp_millis(),
                end.timestamp_millis()
            )
        );
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let created = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let entry = CacheEntry::new(42, created);
        let ttl = DEFAULT_TTL;

        // Exactly at the TTL the entry is still valid; one ms past, it is not.
        let at_ttl = created + chrono::Duration::hours(24);
        assert!(!entry.is_expired(ttl, at_ttl));
        assert!(entry.is_expired(ttl, at_ttl + chrono::Duration::milliseconds(1)));
    }
}
