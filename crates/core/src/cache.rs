use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub provider: String,
    pub ticker: String,
    pub metric: String,
}

impl CacheKey {
    pub fn new(provider: &str, ticker: &str, metric: &str) -> Self {
        Self {
            provider: provider.to_string(),
            ticker: ticker.to_string(),
            metric: metric.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: f64,
    written_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.written_at > ttl
    }
}

/// Process-wide reading cache with lazy, time-only expiry.
///
/// Constructed once at startup and shared by reference; there is no background sweep
/// and no size bound. Expired entries are removed by the read that notices them.
#[derive(Debug)]
pub struct ReadingCache {
    entries: DashMap<CacheKey, CacheEntry>,
    ttl: chrono::Duration,
}

impl Default for ReadingCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ReadingCache {
    pub fn new(ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<f64> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<f64> {
        match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now, self.ttl) => return Some(entry.value),
            Some(_) => {}
            None => return None,
        }

        // The read guard is released above; a concurrent `set` may have refreshed the
        // entry in between, so only remove it if it is still stale.
        self.entries
            .remove_if(key, |_, entry| entry.is_expired(now, self.ttl));
        None
    }

    pub fn set(&self, key: CacheKey, value: f64) {
        self.set_at(key, value, Utc::now());
    }

    pub fn set_at(&self, key: CacheKey, value: f64, written_at: DateTime<Utc>) {
        self.entries.insert(key, CacheEntry { value, written_at });
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
