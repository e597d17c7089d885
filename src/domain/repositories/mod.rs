//! Storage capability definitions for the domain layer.
//!
//! The shortener does not implement a storage engine; it consumes a
//! TTL-capable key-value store through [`MappingStore`]. Implementations live
//! in `crate::infrastructure::store`, and a mock is generated via `mockall`
//! for unit tests.

pub mod mapping_store;

pub use mapping_store::{KeyTtl, MAX_TTL, MappingStore, StoreError, StoreResult, Ttl};

#[cfg(test)]
pub use mapping_store::MockMappingStore;
