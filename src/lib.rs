//! # KV Shortener
//!
//! A URL shortening service storing code to URL mappings with a TTL in a
//! key-value store, built with Axum and Redis.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Entities, the store capability trait, visit events
//! - **Application Layer** ([`application`]) - URL service and code allocator
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-memory stores
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - Random 6-character codes from a 62-character alphabet, allocated with
//!   an atomic set-if-absent
//! - Custom codes that never overwrite a live mapping
//! - One-year default TTL, explicit expiry, optional persistent links
//! - 301 redirects with visit counting off the request path
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379/0"
//! cargo run
//!
//! curl -X POST localhost:8080/api/v1/shorten \
//!   -H 'content-type: application/json' \
//!   -d '{"long_url": "https://example.com"}'
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{ServiceSettings, UrlService};
    pub use crate::domain::entities::{Expiry, Mapping, MappingInfo, ShortCode};
    pub use crate::domain::repositories::{KeyTtl, MappingStore, StoreError, StoreResult, Ttl};
    pub use crate::error::AppError;
    pub use crate::infrastructure::store::{MemoryStore, RedisStore};
    pub use crate::state::AppState;
}
