//! Mapping entity representing a short code to long URL association.

use chrono::{DateTime, Utc};

use super::ShortCode;

/// An immutable short code to long URL association.
///
/// `created_at` is `None` only when the mapping was written without its
/// creation sidecar (by another writer, or read in the instant between the
/// code claim and the sidecar write). `expires_at` is `None` for
/// persistent mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub code: ShortCode,
    pub long_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Mapping {
    /// Creates a new Mapping instance.
    pub fn new(
        code: ShortCode,
        long_url: String,
        created_at: Option<DateTime<Utc>>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            code,
            long_url,
            created_at,
            expires_at,
        }
    }
}

/// A mapping together with a best-effort read of its visit counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingInfo {
    pub mapping: Mapping,
    pub visits: u64,
}

/// Expiration requested when creating a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiry {
    /// Use the configured default TTL (one year unless overridden).
    #[default]
    Default,
    /// Expire at the given instant, which must lie in the future.
    At(DateTime<Utc>),
    /// Never expire. Only honoured when persistent links are enabled.
    Never,
}
