//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`ShortCode`] - A validated short code
//! - [`Mapping`] - A short code to long URL association with its expiry
//! - [`MappingInfo`] - A mapping plus its visit count
//! - [`Expiry`] - Requested lifetime for a new mapping

pub mod mapping;
pub mod short_code;

pub use mapping::{Expiry, Mapping, MappingInfo};
pub use short_code::{MAX_CODE_LENGTH, ShortCode};
