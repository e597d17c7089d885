//! DTOs for health check endpoint.

use serde::{Deserialize, Serialize};

/// Health check response.
///
/// `status` is `"ok"` when the store answers, `"error"` otherwise.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub checks: HealthChecks,
}

/// Health status for each system component.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub store: CheckStatus,
    /// Informational; a closed queue does not fail the check.
    pub visit_queue: CheckStatus,
}

/// Individual component health status.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckStatus {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
