//! Business logic services for the application layer.

pub mod allocator;
pub mod url_service;

pub use allocator::Allocator;
pub use url_service::{ServiceSettings, UrlService};
