//! Utility functions for code generation, URL checks, and request handling.
//!
//! - [`code_generator`] - Random short code generation
//! - [`url_validator`] - Syntactic URL pre-check
//! - [`request_host`] - Host extraction from HTTP headers

pub mod code_generator;
pub mod request_host;
pub mod url_validator;
