//! # Donation Events
//!
//! Defines all event types that flow through the shared bus. Every event is
//! emitted after the owning subsystem has committed the state change it
//! describes.

use serde::{Deserialize, Serialize};
use shared_types::entities::{
    CertificateId, DonationId, FoodItemId, LotId, Timestamp, UserId,
};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonationEvent {
    // =========================================================================
    // SUBSYSTEM 1: DONATION LIFECYCLE
    // =========================================================================
    /// A donor published a new food item.
    FoodItemPublished {
        item_id: FoodItemId,
        donor_id: UserId,
        quantity: u32,
        unit: String,
    },

    /// A receiver reserved an available food item, creating a donation.
    FoodItemReserved {
        item_id: FoodItemId,
        donation_id: DonationId,
        receiver_id: UserId,
    },

    /// A volunteer took a confirmed delivery.
    VolunteerAssigned {
        donation_id: DonationId,
        volunteer_id: UserId,
    },

    /// A donation moved along `confirmed → in_transit → delivered`.
    DonationStatusChanged {
        donation_id: DonationId,
        /// Wire name of the previous status.
        from: String,
        /// Wire name of the new status.
        to: String,
    },

    /// Available items passed their expiration date.
    FoodItemsExpired {
        item_ids: Vec<FoodItemId>,
        at: Timestamp,
    },

    /// A tax certificate was issued for delivered donations.
    TaxCertificateGenerated {
        certificate_id: CertificateId,
        donor_id: UserId,
        donation_ids: Vec<DonationId>,
    },

    // =========================================================================
    // SUBSYSTEM 2: CONSOLIDATED LOGISTICS
    // =========================================================================
    /// Food items were grouped into a zone lot.
    LotCreated {
        lot_id: LotId,
        zone: String,
        item_count: usize,
    },

    /// A receiver reserved a consolidated lot.
    LotReserved {
        lot_id: LotId,
        receiver_id: UserId,
        /// Wire name of the chosen logistics option.
        logistics_option: String,
    },

    /// A receiver joined a lot's shared logistics.
    SharedLogisticsJoined {
        lot_id: LotId,
        receiver_id: UserId,
        participants: usize,
    },
}

impl DonationEvent {
    /// Get the topic for this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::FoodItemPublished { .. } | Self::FoodItemsExpired { .. } => EventTopic::FoodItems,
            Self::FoodItemReserved { .. } => EventTopic::Reservations,
            Self::VolunteerAssigned { .. } | Self::DonationStatusChanged { .. } => {
                EventTopic::Deliveries
            }
            Self::TaxCertificateGenerated { .. } => EventTopic::TaxCertificates,
            Self::LotCreated { .. }
            | Self::LotReserved { .. }
            | Self::SharedLogisticsJoined { .. } => EventTopic::Logistics,
        }
    }

    /// Get the originating subsystem ID.
    #[must_use]
    pub fn source_subsystem(&self) -> u8 {
        match self {
            Self::LotCreated { .. }
            | Self::LotReserved { .. }
            | Self::SharedLogisticsJoined { .. } => 2,
            _ => 1,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Publication and expiration of food items.
    FoodItems,
    /// Food item reservations.
    Reservations,
    /// Volunteer assignment and delivery progress.
    Deliveries,
    /// Tax certificate issuance.
    TaxCertificates,
    /// Consolidated lots and shared logistics.
    Logistics,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Source subsystems to include. Empty means all sources.
    pub source_subsystems: Vec<u8>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            source_subsystems: Vec::new(),
        }
    }

    /// Create a filter for events from specific subsystems.
    #[must_use]
    pub fn from_subsystems(subsystems: Vec<u8>) -> Self {
        Self {
            topics: Vec::new(),
            source_subsystems: subsystems,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &DonationEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let source_match = self.source_subsystems.is_empty()
            || self.source_subsystems.contains(&event.source_subsystem());

        topic_match && source_match
    }
}
