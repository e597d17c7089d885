//! In-process mapping store.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::domain::repositories::{KeyTtl, MappingStore, StoreError, StoreResult, Ttl};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn new(value: &str, ttl: Ttl, now: Instant) -> Self {
        let expires_at = match ttl {
            Ttl::Expires(ttl) => Some(now + ttl),
            Ttl::Persistent => None,
        };
        Self {
            value: value.to_string(),
            expires_at,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// In-memory implementation of [`MappingStore`] backed by `DashMap`.
///
/// Expired entries are evicted lazily when touched and in bulk by
/// [`MemoryStore::purge_expired`], which the `memory` backend runs
/// periodically through [`MemoryStore::spawn_purge_task`]. Atomicity of
/// [`MappingStore::incr`] and [`MappingStore::set_if_absent`] comes from the
/// per-shard lock held by the entry API.
///
/// Used by tests and by the `memory` store backend; contents do not survive
/// a restart.
#[derive(Debug)]
pub struct MemoryStore {
    entries: DashMap<String, StoredValue>,
    clock_offset_ms: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using MemoryStore");
        Self {
            entries: DashMap::new(),
            clock_offset_ms: AtomicU64::new(0),
        }
    }

    /// Moves the store's clock forward, expiring entries whose TTL has elapsed.
    pub fn fast_forward(&self, by: Duration) {
        let millis = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.clock_offset_ms.fetch_add(millis, Ordering::SeqCst);
    }

    fn now(&self) -> Instant {
        Instant::now() + Duration::from_millis(self.clock_offset_ms.load(Ordering::SeqCst))
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let mut removed = 0;
        self.entries.retain(|_, v| {
            let live = v.is_live(now);
            if !live {
                removed += 1;
            }
            live
        });
        removed
    }

    /// Runs [`Self::purge_expired`] every `every` until the store is dropped.
    pub fn spawn_purge_task(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    debug!("MemoryStore dropped, stopping purge task");
                    break;
                };
                let removed = store.purge_expired();
                if removed > 0 {
                    debug!("Purged {} expired entries", removed);
                }
            }
        })
    }

    fn live_value(&self, key: &str, now: Instant) -> Option<StoredValue> {
        let entry = self.entries.get(key)?;
        if entry.is_live(now) {
            return Some(entry.clone());
        }
        drop(entry);
        self.entries.remove_if(key, |_, v| !v.is_live(now));
        None
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Ttl) -> StoreResult<()> {
        let now = self.now();
        self.entries
            .insert(key.to_string(), StoredValue::new(value, ttl, now));
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Ttl) -> StoreResult<bool> {
        let now = self.now();
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live(now) {
                    return Ok(false);
                }
                occupied.insert(StoredValue::new(value, ttl, now));
                Ok(true)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(StoredValue::new(value, ttl, now));
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.live_value(key, self.now()).map(|v| v.value))
    }

    async fn get_many(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        let now = self.now();
        Ok(keys
            .iter()
            .map(|key| self.live_value(key, now).map(|v| v.value))
            .collect())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.live_value(key, self.now()).is_some())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let now = self.now();
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| StoredValue::new("0", Ttl::Persistent, now));

        if !entry.is_live(now) {
            *entry = StoredValue::new("0", Ttl::Persistent, now);
        }

        let current: i64 = entry
            .value
            .parse()
            .map_err(|_| StoreError::Operation(format!("value at {key} is not an integer")))?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::Operation(format!("increment at {key} would overflow")))?;

        entry.value = next.to_string();
        Ok(next)
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let now = self.now();
        Ok(self
            .entries
            .remove(key)
            .is_some_and(|(_, v)| v.is_live(now)))
    }

    async fn expire(&self, key: &str, ttl: Ttl) -> StoreResult<bool> {
        let now = self.now();
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(false);
        };
        if !entry.is_live(now) {
            return Ok(false);
        }

        entry.expires_at = match ttl {
            Ttl::Expires(ttl) => Some(now + ttl),
            Ttl::Persistent => None,
        };
        Ok(true)
    }

    async fn ttl(&self, key: &str) -> StoreResult<KeyTtl> {
        let now = self.now();
        Ok(match self.live_value(key, now) {
            None => KeyTtl::Missing,
            Some(StoredValue {
                expires_at: None, ..
            }) => KeyTtl::Persistent,
            Some(StoredValue {
                expires_at: Some(at),
                ..
            }) => KeyTtl::Expires(at.saturating_duration_since(now)),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
