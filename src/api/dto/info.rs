//! DTOs for link info endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::MappingInfo;

/// Mapping details with the current visit count.
#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub short_code: String,
    pub short_url: String,
    pub long_url: String,
    pub visits: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl InfoResponse {
    pub fn from_info(info: MappingInfo, short_url: String) -> Self {
        Self {
            short_code: info.mapping.code.into_inner(),
            short_url,
            long_url: info.mapping.long_url,
            visits: info.visits,
            created_at: info.mapping.created_at,
            expires_at: info.mapping.expires_at,
        }
    }
}
