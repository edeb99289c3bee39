//! Configuration for the Donation Lifecycle subsystem.

use serde::{Deserialize, Serialize};
use shared_types::Timestamp;

/// Lifecycle limits applied to incoming requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Maximum characters in a food item name.
    pub max_name_len: usize,
    /// Maximum characters in a unit label ("kg", "boxes").
    pub max_unit_len: usize,
    /// Maximum characters in a donor pickup address.
    pub max_address_len: usize,
    /// Minimum time between publication and expiration.
    /// Zero only requires the expiration to be strictly in the future.
    pub min_shelf_life_ms: Timestamp,
    /// Maximum donations covered by one tax certificate.
    pub max_certificate_batch: usize,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_name_len: 120,
            max_unit_len: 24,
            max_address_len: 240,
            min_shelf_life_ms: 0,
            max_certificate_batch: 500,
        }
    }
}

impl LifecycleConfig {
    /// Create a config for testing with small limits.
    pub fn for_testing() -> Self {
        Self {
            max_name_len: 32,
            max_unit_len: 8,
            max_address_len: 64,
            min_shelf_life_ms: 0,
            max_certificate_batch: 4,
        }
    }
}
