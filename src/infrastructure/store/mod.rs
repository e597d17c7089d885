//! Key-value store backends implementing [`MappingStore`].
//!
//! - [`RedisStore`] - Production Redis-backed store
//! - [`MemoryStore`] - In-process store for tests and local development
//!
//! [`MappingStore`]: crate::domain::repositories::MappingStore

mod memory_store;
mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
