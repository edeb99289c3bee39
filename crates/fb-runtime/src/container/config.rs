//! # Runtime Configuration
//!
//! Unified configuration for both subsystems and the runtime itself.
//!
//! Values start from `Default` and are overridden by `FB_*` environment
//! variables. A value that does not parse is ignored with a warning, so a
//! typo never prevents the runtime from starting.

use fb_01_donation_lifecycle::LifecycleConfig;
use fb_02_consolidated_logistics::LogisticsConfig;
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Donation lifecycle limits.
    pub lifecycle: LifecycleConfig,
    /// Consolidated logistics limits.
    pub logistics: LogisticsConfig,
    /// Events buffered per subscriber before the oldest are dropped.
    pub event_channel_capacity: usize,
    /// Load the demo donors, items and providers at startup.
    pub seed_demo_data: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleConfig::default(),
            logistics: LogisticsConfig::default(),
            event_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            seed_demo_data: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A limit that must admit at least one element is zero.
    #[error("{0} must be at least 1")]
    ZeroLimit(&'static str),
}

impl RuntimeConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        override_from(&lookup, "FB_MAX_NAME_LEN", &mut config.lifecycle.max_name_len);
        override_from(&lookup, "FB_MAX_UNIT_LEN", &mut config.lifecycle.max_unit_len);
        override_from(
            &lookup,
            "FB_MAX_ADDRESS_LEN",
            &mut config.lifecycle.max_address_len,
        );
        override_from(
            &lookup,
            "FB_MIN_SHELF_LIFE_MS",
            &mut config.lifecycle.min_shelf_life_ms,
        );
        override_from(
            &lookup,
            "FB_MAX_CERTIFICATE_BATCH",
            &mut config.lifecycle.max_certificate_batch,
        );
        override_from(
            &lookup,
            "FB_MAX_SHARED_PARTICIPANTS",
            &mut config.logistics.max_shared_participants,
        );
        override_from(
            &lookup,
            "FB_MAX_ITEMS_PER_LOT",
            &mut config.logistics.max_items_per_lot,
        );
        override_from(&lookup, "FB_MAX_ZONE_LEN", &mut config.logistics.max_zone_len);
        override_from(
            &lookup,
            "FB_EVENT_CHANNEL_CAPACITY",
            &mut config.event_channel_capacity,
        );
        override_from(&lookup, "FB_SEED_DEMO_DATA", &mut config.seed_demo_data);

        config
    }

    /// Rejects limits that would make every request fail.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroLimit` naming the first zero limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("event_channel_capacity", self.event_channel_capacity),
            (
                "lifecycle.max_certificate_batch",
                self.lifecycle.max_certificate_batch,
            ),
            (
                "logistics.max_shared_participants",
                self.logistics.max_shared_participants,
            ),
            ("logistics.max_items_per_lot", self.logistics.max_items_per_lot),
        ];
        match limits.into_iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(ConfigError::ZeroLimit(name)),
            None => Ok(()),
        }
    }
}

fn override_from<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse() {
        Ok(value) => {
            *target = value;
            info!(key, "Loaded override from environment");
        }
        Err(_) => warn!(key, value = %raw, "Ignoring unparsable environment override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(config, RuntimeConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides_applied() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("FB_MAX_SHARED_PARTICIPANTS", "7"),
            ("FB_MIN_SHELF_LIFE_MS", " 3600000 "),
            ("FB_SEED_DEMO_DATA", "false"),
        ]));
        assert_eq!(config.logistics.max_shared_participants, 7);
        assert_eq!(config.lifecycle.min_shelf_life_ms, 3_600_000);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_unparsable_override_keeps_default() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("FB_MAX_ITEMS_PER_LOT", "many"),
            ("FB_SEED_DEMO_DATA", "yes"),
        ]));
        assert_eq!(
            config.logistics.max_items_per_lot,
            LogisticsConfig::default().max_items_per_lot
        );
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config =
            RuntimeConfig::from_lookup(lookup(&[("FB_EVENT_CHANNEL_CAPACITY", "0")]));
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroLimit("event_channel_capacity"))
        );
    }
}
