//! Core domain entities for the Donation Lifecycle subsystem.

use serde::{Deserialize, Serialize};
use shared_types::{CertificateId, DonationId, FoodItemId, Timestamp, UserId};
use std::fmt;

pub use shared_types::{FoodItem, FoodItemStatus};

/// Donation progress.
///
/// ```text
/// [CONFIRMED] ──→ [IN_TRANSIT] ──→ [DELIVERED]
/// ```
///
/// `Pending` is part of the vocabulary but no operation creates a donation
/// in it; a reservation starts directly at `Confirmed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Pending,
    Confirmed,
    InTransit,
    Delivered,
}

impl DonationStatus {
    /// The only status this one may advance to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Confirmed => Some(Self::InTransit),
            Self::InTransit => Some(Self::Delivered),
            Self::Pending | Self::Delivered => None,
        }
    }

    /// Returns true if `self → to` is a permitted transition.
    pub fn can_transition_to(self, to: Self) -> bool {
        self.next() == Some(to)
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Delivered
    }

    /// Lower-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
        }
    }
}

impl fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The record of one food item reserved by a receiver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub food_item_id: FoodItemId,
    /// Copied from the food item at reservation time.
    pub donor_id: UserId,
    pub receiver_id: Option<UserId>,
    pub volunteer_id: Option<UserId>,
    pub status: DonationStatus,
    pub tax_certificate_id: Option<CertificateId>,
    pub created_at: Timestamp,
}

impl Donation {
    /// A freshly reserved donation.
    pub fn confirmed(
        id: DonationId,
        item: &FoodItem,
        receiver_id: UserId,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            food_item_id: item.id.clone(),
            donor_id: item.donor_id.clone(),
            receiver_id: Some(receiver_id),
            volunteer_id: None,
            status: DonationStatus::Confirmed,
            tax_certificate_id: None,
            created_at,
        }
    }

    /// Waiting for a volunteer to pick it up.
    pub fn is_open_for_pickup(&self) -> bool {
        self.status == DonationStatus::Confirmed && self.volunteer_id.is_none()
    }

    /// Delivered and not yet covered by a tax certificate.
    pub fn is_certifiable(&self) -> bool {
        self.status == DonationStatus::Delivered && self.tax_certificate_id.is_none()
    }

    pub fn is_assigned_to(&self, volunteer_id: &UserId) -> bool {
        self.volunteer_id.as_ref() == Some(volunteer_id)
    }
}

/// Donor-facing record certifying delivered donations for fiscal deduction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCertificate {
    pub id: CertificateId,
    pub donor_id: UserId,
    pub donation_ids: Vec<DonationId>,
    /// Sum of the quantities of the certified food items.
    pub total_items: u64,
    pub issued_at: Timestamp,
}

/// Attributes a donor submits when publishing a food item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFoodItem {
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    pub expiration_date: Timestamp,
    pub donor_address: String,
}
