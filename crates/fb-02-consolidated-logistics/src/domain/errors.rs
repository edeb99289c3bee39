//! Logistics error types.

use shared_types::{
    FoodItemId, FoodItemStatus, LotId, ProviderId, QuoteId, Role, UserId, ValidationError,
};
use thiserror::Error;

/// Logistics error type.
///
/// Every failing operation leaves lots, providers and quotes unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LogisticsError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A lot cannot take this many items.
    #[error("Lot holds at most {max} items, got {count}")]
    TooManyItems { count: usize, max: usize },

    #[error("Food item not found: {0}")]
    FoodItemNotFound(FoodItemId),

    /// A lot may only group available food.
    #[error("Food item {item_id} is {status}, expected available")]
    ItemUnavailable {
        item_id: FoodItemId,
        status: FoodItemStatus,
    },

    #[error("Food item {item_id} already belongs to lot {lot_id}")]
    ItemAlreadyInLot { item_id: FoodItemId, lot_id: LotId },

    #[error("Lot not found: {0}")]
    LotNotFound(LotId),

    /// The lot is not in a state that allows the operation.
    #[error("Invalid state for lot {lot_id}: {reason}")]
    InvalidState { lot_id: LotId, reason: String },

    #[error("Receiver {receiver_id} already shares lot {lot_id}")]
    AlreadyParticipating { lot_id: LotId, receiver_id: UserId },

    #[error("Lot {lot_id} already has the maximum of {max} participants")]
    ParticipantLimit { lot_id: LotId, max: usize },

    #[error("Provider not found: {0}")]
    ProviderNotFound(ProviderId),

    #[error("Provider already registered: {0}")]
    DuplicateProvider(ProviderId),

    #[error("Quote already registered: {0}")]
    DuplicateQuote(QuoteId),

    #[error("No logistics quotes for lot {0}")]
    NoQuotes(LotId),

    /// The acting identity may not perform the operation.
    #[error("{actor} ({role}) is not allowed to {operation}")]
    Unauthorized {
        actor: UserId,
        role: Role,
        operation: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LogisticsError::ItemUnavailable {
            item_id: FoodItemId::new("food-3"),
            status: FoodItemStatus::Reserved,
        };
        assert_eq!(
            err.to_string(),
            "Food item food-3 is reserved, expected available"
        );

        let err = LogisticsError::ParticipantLimit {
            lot_id: LotId::new("lot-1"),
            max: 4,
        };
        assert_eq!(
            err.to_string(),
            "Lot lot-1 already has the maximum of 4 participants"
        );
    }
}
