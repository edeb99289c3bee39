//! Value objects for the Donation Lifecycle subsystem.

use serde::{Deserialize, Serialize};

/// Counts of records per state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStatus {
    pub available_items: usize,
    pub reserved_items: usize,
    pub delivered_items: usize,
    pub expired_items: usize,
    /// Confirmed donations still waiting for a volunteer.
    pub awaiting_volunteer: usize,
    pub confirmed_donations: usize,
    pub in_transit_donations: usize,
    pub delivered_donations: usize,
    /// Delivered donations not yet covered by a certificate.
    pub uncertified_donations: usize,
    pub certificates: usize,
}

impl LifecycleStatus {
    pub fn total_items(&self) -> usize {
        self.available_items + self.reserved_items + self.delivered_items + self.expired_items
    }

    pub fn total_donations(&self) -> usize {
        self.confirmed_donations + self.in_transit_donations + self.delivered_donations
    }
}
