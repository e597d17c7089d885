//! Application layer services implementing business logic.
//!
//! Services consume the [`MappingStore`](crate::domain::repositories::MappingStore)
//! capability and expose the operations used by HTTP handlers and the
//! operator CLI.
//!
//! # Available Services
//!
//! - [`services::url_service::UrlService`] - Short URL creation, lookup and visit counting
//! - [`services::allocator::Allocator`] - Collision-free code allocation

pub mod services;
