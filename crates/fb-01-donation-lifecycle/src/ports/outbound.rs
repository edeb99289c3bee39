//! Outbound (Driven) ports for the Donation Lifecycle subsystem.
//!
//! Event publication goes through `shared_bus::EventPublisher`.

use parking_lot::Mutex;
use shared_types::Timestamp;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Time source for consistent timestamp handling.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Time source that only moves when told to.
///
/// Used by tests and the demo driver to cross expiration dates.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    time: AtomicU64,
}

impl ManualTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time: Timestamp) {
        self.time.store(time, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(Ordering::SeqCst)
    }
}

/// Source of opaque record identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier starting with `prefix`.
    fn next_id(&self, prefix: &str) -> String;
}

/// Random `prefix-<uuid v4>` identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        format!("{prefix}-{}", Uuid::new_v4())
    }
}

/// Predictable `prefix-1`, `prefix-2`, ... identifiers, counted per prefix.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counters: Mutex<HashMap<String, u64>>,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let mut counters = self.counters.lock();
        let counter = counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}-{counter}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_time_source() {
        let time = ManualTimeSource::new(1_000);
        assert_eq!(time.now(), 1_000);

        time.advance(500);
        assert_eq!(time.now(), 1_500);

        time.set(10);
        assert_eq!(time.now(), 10);
    }

    #[test]
    fn test_sequential_ids_are_per_prefix() {
        let ids = SequentialIdGenerator::new();
        assert_eq!(ids.next_id("food"), "food-1");
        assert_eq!(ids.next_id("food"), "food-2");
        assert_eq!(ids.next_id("don"), "don-1");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = UuidIdGenerator;
        let a = ids.next_id("cert");
        let b = ids.next_id("cert");
        assert!(a.starts_with("cert-"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_system_time_is_after_2020() {
        assert!(SystemTimeSource.now() > 1_577_836_800_000);
    }
}
