//! Core domain entities for the Consolidated Logistics subsystem.

use serde::{Deserialize, Serialize};
use shared_types::{FoodItemId, LotId, ProviderId, QuoteId, UserId};
use std::fmt;

/// Who pays for moving a reserved lot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogisticsOption {
    /// The reserving receiver arranges and pays transport alone.
    BeneficiaryCovers,
    /// Other receivers may join and split the transport cost.
    SharedLogistics,
}

impl LogisticsOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeneficiaryCovers => "beneficiary_covers",
            Self::SharedLogistics => "shared_logistics",
        }
    }
}

impl fmt::Display for LogisticsOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation state of a lot.
///
/// ```text
/// [Available] ──reserve──→ [Reserved { participants: [receiver] }]
///                                   │
///                                   └── join (shared only) ──→ participants += receiver
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LotState {
    Available,
    Reserved {
        receiver_id: UserId,
        logistics_option: LogisticsOption,
        /// The reserving receiver first, then joiners in join order.
        participants: Vec<UserId>,
    },
}

/// A zone-based grouping of food items moved together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedLot {
    pub id: LotId,
    pub zone: String,
    pub food_item_ids: Vec<FoodItemId>,
    pub total_quantity: u64,
    pub state: LotState,
}

impl ConsolidatedLot {
    pub fn is_available(&self) -> bool {
        self.state == LotState::Available
    }

    pub fn receiver_id(&self) -> Option<&UserId> {
        match &self.state {
            LotState::Available => None,
            LotState::Reserved { receiver_id, .. } => Some(receiver_id),
        }
    }

    pub fn logistics_option(&self) -> Option<LogisticsOption> {
        match &self.state {
            LotState::Available => None,
            LotState::Reserved {
                logistics_option, ..
            } => Some(*logistics_option),
        }
    }

    pub fn participants(&self) -> &[UserId] {
        match &self.state {
            LotState::Available => &[],
            LotState::Reserved { participants, .. } => participants.as_slice(),
        }
    }

    /// Receivers paying for transport. An unreserved lot is priced as if
    /// one receiver took it alone.
    pub fn paying_parties(&self) -> usize {
        self.participants().len().max(1)
    }
}

/// A transport company quoting for lots. Read-only reference data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticsProvider {
    pub id: ProviderId,
    pub name: String,
    pub contact: String,
    /// Star rating, 1 to 5.
    pub rating: u8,
}

/// A provider's price for moving one lot. Read-only reference data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogisticsQuote {
    pub id: QuoteId,
    pub provider_id: ProviderId,
    pub lot_id: LotId,
    pub price_cents: u64,
    pub estimated_hours: u32,
    pub vehicle: String,
}

/// Per-receiver cost of a lot's cheapest quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostShare {
    pub lot_id: LotId,
    pub quote_id: QuoteId,
    pub provider_id: ProviderId,
    pub total_cents: u64,
    pub participants: usize,
    /// `total_cents / participants`, rounded up to the cent.
    pub per_participant_cents: u64,
}
