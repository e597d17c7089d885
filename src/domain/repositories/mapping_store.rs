//! Key-value store capability consumed by the shortener core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Errors reported by a [`MappingStore`] backend.
///
/// The message carries backend detail for logs only; it is never returned
/// to HTTP clients (see [`crate::error::AppError::storage_failure`]).
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store operation error: {0}")]
    Operation(String),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Longest lifetime accepted for a bounded key (ten years).
pub const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Lifetime requested for a written key.
///
/// `Persistent` must be chosen explicitly; every default path in the service
/// produces a bounded `Expires` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    Expires(Duration),
    Persistent,
}

impl Ttl {
    /// Absolute expiry instant for an entry written at `now`.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Ttl::Expires(ttl) => chrono::Duration::from_std(*ttl).ok().map(|d| now + d),
            Ttl::Persistent => None,
        }
    }
}

/// Remaining lifetime of a stored key, as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key does not exist (never written or already expired).
    Missing,
    /// The key exists and never expires.
    Persistent,
    /// The key exists and expires after the given duration.
    Expires(Duration),
}

/// TTL-capable key-value store holding short code mappings and visit counters.
///
/// All keys and values are strings. Implementations must make [`incr`] and
/// [`set_if_absent`] atomic with respect to concurrent callers.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisStore`] - Redis-backed production store
/// - [`crate::infrastructure::store::MemoryStore`] - In-process substitute
/// - Test mocks available with `cfg(test)`
///
/// [`incr`]: MappingStore::incr
/// [`set_if_absent`]: MappingStore::set_if_absent
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value and TTL.
    async fn set(&self, key: &str, value: &str, ttl: Ttl) -> StoreResult<()>;

    /// Writes `value` under `key` only if no live entry exists.
    ///
    /// Returns `true` if this call created the entry.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Ttl) -> StoreResult<bool>;

    /// Reads the value stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Reads several keys in one round trip, preserving order.
    async fn get_many(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>>;

    /// Returns whether a live entry exists under `key`.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Atomically increments the integer under `key`, creating it at 1 if absent.
    ///
    /// An existing TTL on the key is preserved.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Removes `key`. Returns `true` if a live entry was removed.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Replaces the TTL of an existing key. Returns `false` if the key is missing.
    async fn expire(&self, key: &str, ttl: Ttl) -> StoreResult<bool>;

    /// Reports the remaining lifetime of `key`.
    async fn ttl(&self, key: &str) -> StoreResult<KeyTtl>;

    /// Round-trips to the backend to verify it is reachable.
    async fn ping(&self) -> StoreResult<()>;
}
