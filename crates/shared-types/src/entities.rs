//! # Core Domain Entities
//!
//! Identifiers, actor identity and the food item record shared by every
//! subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, `Role`, `Identity`
//! - **Identifiers**: `FoodItemId`, `DonationId`, `CertificateId`, `LotId`,
//!   `ProviderId`, `QuoteId`
//! - **Food**: `FoodItem`, `FoodItemStatus`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

/// One day in milliseconds.
pub const DAY_MS: Timestamp = 24 * 60 * 60 * 1000;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an opaque identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

opaque_id!(
    /// Identifier of a donor, receiver or volunteer account.
    UserId
);

/// The role an acting user holds.
///
/// Closed set: every dispatch on role is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Publishes food items and requests tax certificates.
    Donor,
    /// An organisation reserving food items and lots.
    Receiver,
    /// Carries reserved food from donor to receiver.
    Volunteer,
}

impl Role {
    /// Lower-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Receiver => "receiver",
            Self::Volunteer => "volunteer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting user as supplied by the identity provider.
///
/// Subsystems trust this value; they only check that the role fits the
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(id: impl Into<UserId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    pub fn donor(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::Donor)
    }

    pub fn receiver(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::Receiver)
    }

    pub fn volunteer(id: impl Into<UserId>) -> Self {
        Self::new(id, Role::Volunteer)
    }

    /// Returns true if this identity holds `role`.
    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

// =============================================================================
// CLUSTER B: IDENTIFIERS
// =============================================================================

opaque_id!(
    /// Identifier of a published food item.
    FoodItemId
);
opaque_id!(
    /// Identifier of a donation record.
    DonationId
);
opaque_id!(
    /// Identifier of a tax certificate.
    CertificateId
);
opaque_id!(
    /// Identifier of a consolidated lot.
    LotId
);
opaque_id!(
    /// Identifier of a logistics provider.
    ProviderId
);
opaque_id!(
    /// Identifier of a logistics quote.
    QuoteId
);

// =============================================================================
// CLUSTER C: FOOD
// =============================================================================

/// Food item lifecycle state.
///
/// ```text
/// [Available] ──reserve──→ [Reserved] ──deliver──→ [Delivered]
///      │
///      └── expiration passed ──→ [Expired]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodItemStatus {
    #[default]
    Available,
    Reserved,
    Delivered,
    Expired,
}

impl FoodItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Delivered => "delivered",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for FoodItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of donated food tracked from publication to delivery.
///
/// Items are never deleted; they stay in the store for history once
/// delivered or expired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: FoodItemId,
    pub donor_id: UserId,
    pub name: String,
    pub quantity: u32,
    pub unit: String,
    /// Expiration instant (ms).
    pub expiration_date: Timestamp,
    /// Pickup address shown to volunteers.
    pub donor_address: String,
    pub status: FoodItemStatus,
    pub created_at: Timestamp,
}

impl FoodItem {
    pub fn is_available(&self) -> bool {
        self.status == FoodItemStatus::Available
    }

    /// True once `now` has reached the expiration instant.
    pub fn is_past_expiration(&self, now: Timestamp) -> bool {
        now >= self.expiration_date
    }
}
