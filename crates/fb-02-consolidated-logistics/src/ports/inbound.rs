//! Inbound (Driving) ports for the Consolidated Logistics subsystem.

use crate::domain::{
    ConsolidatedLot, CostShare, LogisticsError, LogisticsOption, LogisticsProvider,
    LogisticsQuote,
};
use shared_types::{FoodItemId, Identity, LotId, ProviderId, UserId};

/// Primary API for the Consolidated Logistics subsystem.
pub trait LogisticsApi: Send + Sync {
    /// Ingests a logistics provider.
    fn register_provider(&self, provider: LogisticsProvider) -> Result<(), LogisticsError>;

    /// Ingests a quote for a registered lot from a registered provider.
    fn register_quote(&self, quote: LogisticsQuote) -> Result<(), LogisticsError>;

    /// Groups available food items of one zone into a lot.
    fn create_lot(
        &self,
        zone: &str,
        food_item_ids: &[FoodItemId],
    ) -> Result<ConsolidatedLot, LogisticsError>;

    /// Reserves an available lot for the receiver. First writer wins.
    ///
    /// # Errors
    /// - `Unauthorized` unless the actor is a receiver
    /// - `InvalidState` if the lot is already reserved
    fn reserve_lot(
        &self,
        receiver: &Identity,
        lot_id: &LotId,
        logistics_option: LogisticsOption,
    ) -> Result<ConsolidatedLot, LogisticsError>;

    /// Joins a lot reserved with shared logistics.
    ///
    /// # Errors
    /// - `Unauthorized` unless the actor is a receiver
    /// - `InvalidState` unless the lot is reserved with shared logistics
    /// - `AlreadyParticipating`, `ParticipantLimit`
    fn join_shared_logistics(
        &self,
        receiver: &Identity,
        lot_id: &LotId,
    ) -> Result<ConsolidatedLot, LogisticsError>;

    fn get_lot(&self, lot_id: &LotId) -> Option<ConsolidatedLot>;

    /// Unreserved lots whose items are all still available.
    fn get_available_lots(&self) -> Vec<ConsolidatedLot>;

    /// Shared lots with room for another receiver.
    fn get_open_shared_lots(&self) -> Vec<ConsolidatedLot>;

    /// Lots the receiver reserved or joined.
    fn get_lots_for_receiver(&self, receiver_id: &UserId) -> Vec<ConsolidatedLot>;

    fn get_logistics_quotes(&self, lot_id: &LotId) -> Vec<LogisticsQuote>;

    fn get_provider(&self, provider_id: &ProviderId) -> Option<LogisticsProvider>;

    fn get_providers(&self) -> Vec<LogisticsProvider>;

    fn cheapest_quote(&self, lot_id: &LotId) -> Option<LogisticsQuote>;

    /// Cheapest quote split across the lot's paying receivers.
    fn cost_share(&self, lot_id: &LotId) -> Result<CostShare, LogisticsError>;
}
