//! Sources of randomness and time for generated identifiers

use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Prefix of generated patient IDs
pub const ANONYMOUS_ID_PREFIX: &str = "ANON-";

/// Clock and random source used when generating replacement identifiers
pub trait IdGenerator: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn timestamp_millis(&self) -> u64;

    /// Uniform value in `0..bound`
    fn random_below(&self, bound: u32) -> u32;
}

/// System clock and thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIdGenerator;

impl IdGenerator for SystemIdGenerator {
    fn timestamp_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    fn random_below(&self, bound: u32) -> u32 {
        rand::rng().random_range(0..bound.max(1))
    }
}

/// Fresh `ANON-{millis}-{nnnn}` patient ID
#[must_use]
pub fn anonymous_patient_id(generator: &impl IdGenerator) -> String {
    format!(
        "{ANONYMOUS_ID_PREFIX}{millis}-{random:04}",
        millis = generator.timestamp_millis(),
        random = generator.random_below(10_000),
    )
}
