//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Store capability trait
//! - [`visit_event`] - Visit tracking event model
//! - [`visit_worker`] - Detached visit counter worker
//!
//! # Visit Processing Flow
//!
//! 1. HTTP handler resolves the short code and answers with a redirect
//! 2. [`visit_event::VisitEvent`] is sent to a bounded channel
//! 3. [`visit_worker::run_visit_worker`] increments the counter off the request path
//! 4. Failures are logged, never reported to the client

pub mod entities;
pub mod repositories;
pub mod visit_event;
pub mod visit_worker;
