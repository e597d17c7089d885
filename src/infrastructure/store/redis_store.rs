//! Redis-backed mapping store.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, RedisError, aio::ConnectionManager};
use std::time::Duration;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error, info, warn};

use crate::domain::repositories::{KeyTtl, MappingStore, StoreError, StoreResult, Ttl};

/// Redis implementation of [`MappingStore`].
///
/// Uses a `ConnectionManager`, which multiplexes commands over one connection
/// and reconnects transparently. Cloning the manager is cheap, so every
/// operation works on its own clone.
pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// Connection attempts are retried with jittered exponential backoff
    /// (`retries` additional attempts, capped at 5s between tries).
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379/0"`)
    /// - `key_prefix` - Namespace prepended to every key (may be empty)
    /// - `retries` - Additional connection attempts after the first failure
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Connection`] if the URL is invalid or every
    /// attempt fails.
    pub async fn connect(redis_url: &str, key_prefix: &str, retries: usize) -> StoreResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| StoreError::Connection(format!("Failed to create Redis client: {e}")))?;

        let strategy = ExponentialBackoff::from_millis(10)
            .factor(10)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(retries);

        let conn = Retry::spawn(strategy, || {
            let client = client.clone();
            async move {
                let mut conn = ConnectionManager::new(client).await.map_err(|e| {
                    warn!("Redis connection attempt failed: {}", e);
                    StoreError::Connection(format!("Failed to connect to Redis: {e}"))
                })?;
                conn.ping::<()>().await.map_err(|e| {
                    warn!("Redis PING failed: {}", e);
                    StoreError::Connection(format!("Redis PING failed: {e}"))
                })?;
                Ok::<_, StoreError>(conn)
            }
        })
        .await?;

        info!("Connected to Redis");

        Ok(Self {
            conn,
            key_prefix: key_prefix.to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

/// Maps a Redis error to a store error, logging the backend detail.
fn store_error(op: &str, key: &str, e: RedisError) -> StoreError {
    error!("Redis {} error for {}: {}", op, key, e);
    if e.is_io_error() || e.is_connection_dropped() || e.is_connection_refusal() || e.is_timeout()
    {
        StoreError::Connection(e.to_string())
    } else {
        StoreError::Operation(e.to_string())
    }
}

/// `PEXPIRE` for a bounded TTL, `PERSIST` to clear one.
fn expire_command(full_key: &str, ttl: Ttl) -> (&'static str, redis::Cmd) {
    match ttl {
        Ttl::Expires(ttl) => {
            let mut cmd = redis::cmd("PEXPIRE");
            cmd.arg(full_key).arg(ttl_millis(ttl));
            ("PEXPIRE", cmd)
        }
        Ttl::Persistent => {
            let mut cmd = redis::cmd("PERSIST");
            cmd.arg(full_key);
            ("PERSIST", cmd)
        }
    }
}

/// Millisecond TTL as Redis expects it; sub-millisecond values round up to 1.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl MappingStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl: Ttl) -> StoreResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        let result = match ttl {
            Ttl::Expires(ttl) => {
                conn.pset_ex::<_, _, ()>(&full_key, value, ttl_millis(ttl))
                    .await
            }
            Ttl::Persistent => conn.set::<_, _, ()>(&full_key, value).await,
        };

        result.map_err(|e| store_error("SET", key, e))?;
        debug!("Store SET: {} ({:?})", key, ttl);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Ttl) -> StoreResult<bool> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(&full_key).arg(value).arg("NX");
        if let Ttl::Expires(ttl) = ttl {
            cmd.arg("PX").arg(ttl_millis(ttl));
        }

        let reply: Option<String> = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("SET NX", key, e))?;

        let created = reply.is_some();
        debug!("Store SET NX: {} -> {}", key, created);
        Ok(created)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        conn.get::<_, Option<String>>(&full_key)
            .await
            .map_err(|e| store_error("GET", key, e))
    }

    async fn get_many(&self, keys: &[String]) -> StoreResult<Vec<Option<String>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let full_keys: Vec<String> = keys.iter().map(|k| self.build_key(k)).collect();
        let mut conn = self.conn.clone();

        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&full_keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("MGET", &keys[0], e))?;

        Ok(values)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        conn.exists::<_, bool>(&full_key)
            .await
            .map_err(|e| store_error("EXISTS", key, e))
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        conn.incr::<_, _, i64>(&full_key, 1)
            .await
            .map_err(|e| store_error("INCR", key, e))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        let deleted = conn
            .del::<_, i64>(&full_key)
            .await
            .map_err(|e| store_error("DEL", key, e))?;
        Ok(deleted > 0)
    }

    async fn expire(&self, key: &str, ttl: Ttl) -> StoreResult<bool> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        let (name, cmd) = expire_command(&full_key, ttl);
        let updated: i64 = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error(name, key, e))?;

        // PERSIST returns 0 for an existing key without TTL.
        if updated == 0 && ttl == Ttl::Persistent {
            return self.exists(key).await;
        }
        Ok(updated == 1)
    }

    async fn ttl(&self, key: &str) -> StoreResult<KeyTtl> {
        let full_key = self.build_key(key);
        let mut conn = self.conn.clone();

        let millis: i64 = redis::cmd("PTTL")
            .arg(&full_key)
            .query_async(&mut conn)
            .await
            .map_err(|e| store_error("PTTL", key, e))?;

        Ok(match millis {
            -2 => KeyTtl::Missing,
            -1 => KeyTtl::Persistent,
            ms => KeyTtl::Expires(Duration::from_millis(ms.max(0) as u64)),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.ping::<()>()
            .await
            .map_err(|e| store_error("PING", "-", e))
    }
}
