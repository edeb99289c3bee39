//! Configuration for the Consolidated Logistics subsystem.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticsConfig {
    /// Maximum receivers sharing one lot, the reserving receiver included.
    pub max_shared_participants: usize,
    /// Maximum food items grouped into one lot.
    pub max_items_per_lot: usize,
    /// Maximum characters in a zone name.
    pub max_zone_len: usize,
}

impl Default for LogisticsConfig {
    fn default() -> Self {
        Self {
            max_shared_participants: 5,
            max_items_per_lot: 50,
            max_zone_len: 64,
        }
    }
}

impl LogisticsConfig {
    /// Create a config for testing with small limits.
    pub fn for_testing() -> Self {
        Self {
            max_shared_participants: 3,
            max_items_per_lot: 4,
            max_zone_len: 16,
        }
    }
}
