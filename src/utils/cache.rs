use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

/// Source of the current time, injectable so cache expiry can be tested
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Debug)]
pub struct CacheEntry<V> {
    pub payload: Arc<V>,
    pub fetched_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Keyed payloads that expire `ttl` after they were fetched
///
/// Entries are replaced wholesale on insert, never merged.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The cached payload for `key`, if one exists and is still fresh at `now`
    pub async fn get(&self, key: &str, now: DateTime<Utc>) -> Option<Arc<V>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_valid(now, self.ttl))
            .map(|entry| entry.payload.clone())
    }

    pub async fn insert(&self, key: &str, payload: Arc<V>, fetched_at: DateTime<Utc>) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                fetched_at,
            },
        );
    }

    pub async fn fetched_at(&self, key: &str) -> Option<DateTime<Utc>> {
        self.entries.read().await.get(key).map(|e| e.fetched_at)
    }
}
