//! Infrastructure layer for external integrations.
//!
//! This layer implements the store capability defined by the domain layer.
//!
//! # Modules
//!
//! - [`store`] - Redis and in-memory [`crate::domain::repositories::MappingStore`] backends

pub mod store;
