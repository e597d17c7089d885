//! Collision-free short code allocation.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::domain::entities::ShortCode;
use crate::domain::repositories::{MappingStore, StoreError, StoreResult, Ttl};
use crate::error::AppError;
use crate::utils::code_generator::CodeGenerator;

/// Default number of candidates tried per code length.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Combines the code generator with the store to produce unused codes.
///
/// # Escalation
///
/// Each search runs up to `max_attempts` candidates at the configured length,
/// then one more round at `length + 1`. If both rounds are exhausted the
/// allocation fails with [`AppError::KeyspaceExhausted`].
pub struct Allocator {
    store: Arc<dyn MappingStore>,
    generator: CodeGenerator,
    max_attempts: u32,
    allow_degraded_entropy: bool,
}

impl Allocator {
    pub fn new(
        store: Arc<dyn MappingStore>,
        generator: CodeGenerator,
        max_attempts: u32,
        allow_degraded_entropy: bool,
    ) -> Self {
        Self {
            store,
            generator,
            max_attempts: max_attempts.max(1),
            allow_degraded_entropy,
        }
    }

    /// Returns a code that had no live mapping when it was checked.
    ///
    /// The check is not atomic with any later write: a concurrent allocator
    /// may pick the same code before it is stored. Prefer [`Self::claim`]
    /// when the code is about to be written.
    ///
    /// # Errors
    ///
    /// - [`AppError::StorageFailure`] if the existence check fails
    /// - [`AppError::KeyspaceExhausted`] if every candidate was taken
    /// - [`AppError::EntropyUnavailable`] if the random source failed on every attempt
    pub async fn allocate(&self) -> Result<ShortCode, AppError> {
        let store = self.store.clone();
        self.search(move |code| {
            let store = store.clone();
            async move {
                let taken = store.exists(code.as_str()).await?;
                Ok::<_, StoreError>((!taken).then_some(code))
            }
        })
        .await
    }

    /// Allocates a code and writes `value` under it in one atomic step.
    ///
    /// Uses the store's set-if-absent primitive, so exactly one writer can
    /// claim a given code.
    ///
    /// # Errors
    ///
    /// Same as [`Self::allocate`].
    pub async fn claim(&self, value: &str, ttl: Ttl) -> Result<ShortCode, AppError> {
        let store = self.store.clone();
        let value = value.to_string();
        self.search(move |code| {
            let store = store.clone();
            let value = value.clone();
            async move {
                let created = store.set_if_absent(code.as_str(), &value, ttl).await?;
                Ok::<_, StoreError>(created.then_some(code))
            }
        })
        .await
    }

    /// Generates candidates until `accept` takes one, escalating the length once.
    async fn search<F, Fut>(&self, mut accept: F) -> Result<ShortCode, AppError>
    where
        F: FnMut(ShortCode) -> Fut,
        Fut: Future<Output = StoreResult<Option<ShortCode>>>,
    {
        let base_length = self.generator.length();
        let rounds = [self.generator, self.generator.with_length(base_length + 1)];

        let mut collisions = 0u32;
        let mut entropy_failures = 0u32;

        for generator in rounds {
            for _ in 0..self.max_attempts {
                let candidate = match generator.generate() {
                    Ok(code) => code,
                    Err(e) if self.allow_degraded_entropy => {
                        warn!("Secure code generation failed, using degraded source: {}", e);
                        metrics::counter!("shortener_degraded_codes_total").increment(1);
                        generator.generate_degraded()
                    }
                    Err(e) => {
                        warn!("Secure code generation failed: {}", e);
                        entropy_failures += 1;
                        continue;
                    }
                };

                if let Some(code) = accept(candidate).await? {
                    return Ok(code);
                }

                collisions += 1;
                debug!("Short code collision (length {})", generator.length());
            }

            if generator.length() == base_length {
                warn!(
                    "No free code after {} attempts at length {}, escalating to {}",
                    self.max_attempts,
                    base_length,
                    base_length + 1
                );
            }
        }

        let attempts = collisions + entropy_failures;
        if collisions == 0 {
            error!("Entropy source failed on all {} attempts", attempts);
            return Err(AppError::entropy_unavailable(attempts));
        }

        error!(
            "Keyspace exhausted: {} attempts up to length {}",
            attempts,
            base_length + 1
        );
        metrics::counter!("shortener_keyspace_exhausted_total").increment(1);
        Err(AppError::keyspace_exhausted(attempts, base_length + 1))
    }
}
