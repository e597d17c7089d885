//! Short code generation.
//!
//! Codes are drawn uniformly from the 62-character alphabet `[a-zA-Z0-9]`.
//! The secure path reads OS entropy through `getrandom`; a time-seeded
//! fallback exists for degraded operation and is never used implicitly.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::domain::entities::ShortCode;

/// Characters a generated code is drawn from.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Default length of generated codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Largest multiple of 62 that fits in a byte. Bytes at or above it are
/// discarded so that `byte % 62` stays uniform.
const REJECTION_BOUND: u8 = 248;

/// Random bytes requested from the OS per refill.
const ENTROPY_CHUNK: usize = 32;

/// Errors from the secure generation path.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("entropy source failed: {0}")]
    Entropy(getrandom::Error),
}

/// Fills a buffer with cryptographically secure random bytes.
pub type EntropySource = fn(&mut [u8]) -> Result<(), getrandom::Error>;

/// Generates fixed-length random short codes.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
    entropy: EntropySource,
}

impl CodeGenerator {
    /// Creates a generator reading the OS random source.
    pub fn new(length: usize) -> Self {
        Self::with_entropy(length, getrandom::fill)
    }

    /// Creates a generator reading from a custom entropy source.
    pub fn with_entropy(length: usize, entropy: EntropySource) -> Self {
        Self { length, entropy }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Same generator producing codes of another length.
    pub fn with_length(&self, length: usize) -> Self {
        Self { length, ..*self }
    }

    /// Generates a code from the OS cryptographically secure random source.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Entropy`] if the OS random source fails.
    /// Callers should treat this as retryable.
    pub fn generate(&self) -> Result<ShortCode, GeneratorError> {
        let mut code = String::with_capacity(self.length);
        let mut buffer = [0u8; ENTROPY_CHUNK];

        while code.len() < self.length {
            (self.entropy)(&mut buffer).map_err(GeneratorError::Entropy)?;

            for &byte in buffer.iter().filter(|&&b| b < REJECTION_BOUND) {
                code.push(ALPHABET[byte as usize % ALPHABET.len()] as char);
                if code.len() == self.length {
                    break;
                }
            }
        }

        Ok(ShortCode::from_generated(code))
    }

    /// Generates a code from a PRNG seeded with the current time.
    ///
    /// Degraded mode: the output is predictable and two processes seeded in
    /// the same nanosecond produce the same code. Only for use when
    /// [`Self::generate`] fails and degraded entropy is explicitly allowed.
    pub fn generate_degraded(&self) -> ShortCode {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let mut rng = StdRng::seed_from_u64(seed);

        let code = (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();

        ShortCode::from_generated(code)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}
