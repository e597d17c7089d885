//! Short URL creation, lookup and visit counting.

use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::allocator::{Allocator, DEFAULT_MAX_ATTEMPTS};
use crate::domain::entities::{Expiry, Mapping, MappingInfo, ShortCode};
use crate::domain::repositories::{KeyTtl, MAX_TTL, MappingStore, StoreResult, Ttl};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, DEFAULT_CODE_LENGTH};

/// Default mapping lifetime: 365 days.
pub const DEFAULT_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Key prefix for visit counters.
const VISITS_PREFIX: &str = "visits:";

/// Key prefix for creation timestamps.
const CREATED_PREFIX: &str = "created:";

fn visits_key(code: &str) -> String {
    format!("{VISITS_PREFIX}{code}")
}

fn created_key(code: &str) -> String {
    format!("{CREATED_PREFIX}{code}")
}

/// Tunables for [`UrlService`].
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub code_length: usize,
    pub max_attempts: u32,
    pub default_ttl: Duration,
    pub allow_persistent_links: bool,
    pub allow_degraded_entropy: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            code_length: DEFAULT_CODE_LENGTH,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_ttl: DEFAULT_TTL,
            allow_persistent_links: false,
            allow_degraded_entropy: false,
        }
    }
}

/// Service orchestrating code allocation, persistence and visit counting.
///
/// # Store Layout
///
/// - `<code>` - long URL, with the mapping's TTL
/// - `created:<code>` - RFC 3339 creation time, same TTL
/// - `visits:<code>` - visit counter, aligned to the mapping's TTL on first visit
pub struct UrlService {
    store: Arc<dyn MappingStore>,
    allocator: Allocator,
    default_ttl: Duration,
    allow_persistent_links: bool,
}

impl UrlService {
    /// Creates a new URL service over the given store.
    pub fn new(store: Arc<dyn MappingStore>, settings: ServiceSettings) -> Self {
        let allocator = Allocator::new(
            store.clone(),
            CodeGenerator::new(settings.code_length),
            settings.max_attempts,
            settings.allow_degraded_entropy,
        );

        Self {
            store,
            allocator,
            default_ttl: settings.default_ttl.min(MAX_TTL),
            allow_persistent_links: settings.allow_persistent_links,
        }
    }

    /// Creates a short URL.
    ///
    /// `long_url` is expected to have passed the URL pre-check already; only
    /// emptiness is verified here.
    ///
    /// # Arguments
    ///
    /// - `long_url` - The original URL to shorten
    /// - `custom_code` - Optional user-chosen code; never overwrites a live mapping
    /// - `expiry` - Requested lifetime (see [`Expiry`])
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidInput`] for an empty URL, a malformed custom code,
    ///   an expiry in the past, or `Expiry::Never` while persistent links are disabled
    /// - [`AppError::CodeAlreadyExists`] if the custom code is taken
    /// - [`AppError::StorageFailure`] if a store write fails
    /// - [`AppError::KeyspaceExhausted`] if no free code could be found
    pub async fn create_short_url(
        &self,
        long_url: String,
        custom_code: Option<String>,
        expiry: Expiry,
    ) -> Result<Mapping, AppError> {
        if long_url.trim().is_empty() {
            return Err(AppError::invalid_input(
                "long_url must not be empty",
                json!({ "field": "long_url" }),
            ));
        }

        let now = Utc::now();
        let ttl = self.resolve_ttl(expiry, now)?;

        let code = match custom_code {
            Some(custom) => {
                let code = ShortCode::parse(&custom)?;
                if !self
                    .store
                    .set_if_absent(code.as_str(), &long_url, ttl)
                    .await?
                {
                    return Err(AppError::code_already_exists(code.as_str()));
                }
                code
            }
            None => self.allocator.claim(&long_url, ttl).await?,
        };

        if let Err(e) = self
            .store
            .set(&created_key(code.as_str()), &now.to_rfc3339(), ttl)
            .await
        {
            // Release the claim so the failed request leaves nothing behind.
            if let Err(cleanup) = self.store.delete(code.as_str()).await {
                error!("Failed to release code {} after write error: {}", code, cleanup);
            }
            return Err(e.into());
        }

        // A previous mapping under this code may have left a counter behind.
        if let Err(e) = self.store.delete(&visits_key(code.as_str())).await {
            warn!("Failed to reset visit counter for {}: {}", code, e);
        }

        debug!("Created mapping {} -> {}", code, long_url);

        Ok(Mapping::new(code, long_url, Some(now), ttl.expires_at(now)))
    }

    /// Retrieves a mapping and its current visit count.
    ///
    /// A missing or unparsable counter reads as zero.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is unknown or expired
    /// - [`AppError::StorageFailure`] on store errors
    pub async fn get_url(&self, code: &str) -> Result<MappingInfo, AppError> {
        let code = ShortCode::parse(code).map_err(|_| AppError::not_found(code))?;

        let keys = [
            code.as_str().to_string(),
            created_key(code.as_str()),
            visits_key(code.as_str()),
        ];
        let mut values = self.store.get_many(&keys).await?.into_iter();

        let long_url = values
            .next()
            .flatten()
            .ok_or_else(|| AppError::not_found(code.as_str()))?;
        let created_at = values
            .next()
            .flatten()
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|ts| ts.with_timezone(&Utc));
        let visits = values
            .next()
            .flatten()
            .map(|raw| {
                raw.parse::<u64>().unwrap_or_else(|_| {
                    warn!("Ignoring malformed visit counter for {}: {:?}", code, raw);
                    0
                })
            })
            .unwrap_or(0);

        let expires_at = match self.store.ttl(code.as_str()).await? {
            KeyTtl::Missing => return Err(AppError::not_found(code.as_str())),
            KeyTtl::Persistent => None,
            KeyTtl::Expires(remaining) => Ttl::Expires(remaining).expires_at(Utc::now()),
        };

        Ok(MappingInfo {
            mapping: Mapping::new(code, long_url, created_at, expires_at),
            visits,
        })
    }

    /// Resolves a code to its long URL with a single store read.
    ///
    /// Used on the redirect path, which does not need metadata.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is unknown or expired
    /// - [`AppError::StorageFailure`] on store errors
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        if ShortCode::parse(code).is_err() {
            return Err(AppError::not_found(code));
        }

        self.store
            .get(code)
            .await?
            .ok_or_else(|| AppError::not_found(code))
    }

    /// Records one visit for `code`.
    ///
    /// Runs detached from the request that triggered it, so failures are
    /// logged and never returned.
    pub async fn increment_visits(&self, code: &str) {
        match self.try_increment_visits(code).await {
            Ok(count) => debug!("Visit recorded for {} (total {})", code, count),
            Err(e) => error!("Failed to record visit for {}: {}", code, e),
        }
    }

    /// Increments the counter and, when it was just created, ties its
    /// lifetime to the mapping's. A counter whose mapping is already gone is
    /// removed again.
    async fn try_increment_visits(&self, code: &str) -> StoreResult<i64> {
        let key = visits_key(code);
        let count = self.store.incr(&key).await?;

        if count == 1 {
            match self.store.ttl(code).await? {
                KeyTtl::Expires(remaining) => {
                    self.store.expire(&key, Ttl::Expires(remaining)).await?;
                }
                KeyTtl::Persistent => {}
                KeyTtl::Missing => {
                    debug!("Dropping visit counter for expired code {}", code);
                    self.store.delete(&key).await?;
                }
            }
        }

        Ok(count)
    }

    /// Returns whether the store is reachable.
    pub async fn health(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Store health check failed: {}", e);
                false
            }
        }
    }

    fn resolve_ttl(&self, expiry: Expiry, now: DateTime<Utc>) -> Result<Ttl, AppError> {
        match expiry {
            Expiry::Default => Ok(Ttl::Expires(self.default_ttl)),
            Expiry::At(at) => {
                let Some(remaining) = (at - now).to_std().ok().filter(|d| !d.is_zero()) else {
                    return Err(AppError::invalid_input(
                        "expires_at must be in the future",
                        json!({ "expires_at": at.to_rfc3339() }),
                    ));
                };
                if remaining > MAX_TTL {
                    return Err(AppError::invalid_input(
                        "expires_at is too far in the future",
                        json!({
                            "expires_at": at.to_rfc3339(),
                            "max_ttl_seconds": MAX_TTL.as_secs()
                        }),
                    ));
                }
                Ok(Ttl::Expires(remaining))
            }
            Expiry::Never if self.allow_persistent_links => Ok(Ttl::Persistent),
            Expiry::Never => Err(AppError::invalid_input(
                "Links without expiry are disabled",
                json!({ "field": "no_expiry" }),
            )),
        }
    }
}
