//! Visit event model for detached counter updates.

use chrono::{DateTime, Utc};

/// A single resolved redirect, queued for counting.
///
/// Created by the redirect handler after the response has been decided and
/// sent over a bounded channel to
/// [`crate::domain::visit_worker::run_visit_worker`]. Losing an event only
/// makes the counter lag; it never affects the redirect itself.
#[derive(Debug, Clone)]
pub struct VisitEvent {
    pub code: String,
    pub at: DateTime<Utc>,
}

impl VisitEvent {
    /// Creates an event stamped with the current time.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            at: Utc::now(),
        }
    }
}
