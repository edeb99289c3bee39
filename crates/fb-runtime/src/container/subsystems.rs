//! # Subsystem Container
//!
//! Holds both subsystem instances and wires their ports.
//!
//! ## Initialization Order
//!
//! ```text
//! Phase 1: Event bus (shared infrastructure)
//! Phase 2: Donation Lifecycle (fb-01, no subsystem dependencies)
//! Phase 3: Consolidated Logistics (fb-02, reads fb-01 items via adapter)
//! ```
//!
//! ## Thread Safety
//!
//! - Services are shared through `Arc`; each guards its own state
//! - Subsystems never call each other's mutating operations

use std::sync::Arc;

use tracing::{info, instrument};

use fb_01_donation_lifecycle::{
    IdGenerator, LifecycleService, SystemTimeSource, TimeSource, UuidIdGenerator,
};
use fb_02_consolidated_logistics::LogisticsService;
use shared_bus::{EventFilter, InMemoryEventBus, Subscription};

use crate::adapters::LifecycleItemGateway;
use crate::container::config::RuntimeConfig;

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Donation Lifecycle (Subsystem 1).
    pub lifecycle: Arc<LifecycleService>,

    /// Consolidated Logistics (Subsystem 2).
    /// Reads food items from the lifecycle subsystem.
    pub logistics: Arc<LogisticsService>,

    /// Event bus every subsystem publishes to.
    pub event_bus: Arc<InMemoryEventBus>,

    /// Runtime configuration (immutable after initialization).
    pub config: RuntimeConfig,
}

impl SubsystemContainer {
    /// Create a container on wall-clock time with random identifiers.
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_ports(config, Arc::new(SystemTimeSource), Arc::new(UuidIdGenerator))
    }

    /// Create a container with explicit clock and identifier ports.
    #[instrument(name = "subsystem_init", skip_all)]
    pub fn with_ports(
        config: RuntimeConfig,
        time: Arc<dyn TimeSource>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        info!("Initializing FoodBridge subsystem container");

        info!("Phase 1: Creating shared infrastructure");
        let event_bus = Arc::new(InMemoryEventBus::with_capacity(
            config.event_channel_capacity,
        ));

        info!("Phase 2: Initializing donation lifecycle");
        let lifecycle = Arc::new(LifecycleService::with_ports(
            config.lifecycle.clone(),
            time,
            ids,
            event_bus.clone(),
        ));
        info!("  [1] Donation Lifecycle initialized");

        info!("Phase 3: Initializing consolidated logistics");
        let logistics = Arc::new(LogisticsService::new(
            config.logistics.clone(),
            Arc::new(LifecycleItemGateway::new(lifecycle.clone())),
            event_bus.clone(),
        ));
        info!("  [2] Consolidated Logistics initialized");

        Self {
            lifecycle,
            logistics,
            event_bus,
            config,
        }
    }

    /// Subscribe to events from every subsystem.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.event_bus.subscribe(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fb_01_donation_lifecycle::{LifecycleApi, ManualTimeSource, SequentialIdGenerator};
    use fb_02_consolidated_logistics::LogisticsApi;

    #[test]
    fn test_container_wires_shared_bus() {
        let container = SubsystemContainer::with_ports(
            RuntimeConfig::default(),
            Arc::new(ManualTimeSource::new(0)),
            Arc::new(SequentialIdGenerator::new()),
        );
        let _subscription = container.subscribe(EventFilter::all());

        assert_eq!(container.event_bus.subscriber_count(), 1);
        assert_eq!(
            container.event_bus.capacity(),
            container.config.event_channel_capacity
        );
        assert_eq!(container.lifecycle.get_status().total_items(), 0);
        assert!(container.logistics.get_available_lots().is_empty());
    }
}
