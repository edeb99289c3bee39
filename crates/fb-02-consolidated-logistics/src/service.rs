//! Consolidated Logistics Service
//!
//! Implements `LogisticsApi` over a `LogisticsRegistry` behind one
//! `RwLock`. Item availability is read through `FoodItemGateway` while the
//! write guard is held, so a lot's check and its reservation are one step.
//! Reserving a lot holds its items through the same gateway before the lot
//! changes state.

use crate::config::LogisticsConfig;
use crate::domain::{
    ConsolidatedLot, CostShare, LogisticsError, LogisticsOption, LogisticsProvider,
    LogisticsQuote, LogisticsRegistry,
};
use crate::ports::{FoodItemGateway, LogisticsApi};
use parking_lot::RwLock;
use shared_bus::{DonationEvent, EventPublisher};
use shared_types::{FoodItem, FoodItemId, Identity, LotId, ProviderId, Role, UserId};
use std::sync::Arc;
use tracing::{debug, info};

pub struct LogisticsService {
    registry: RwLock<LogisticsRegistry>,
    items: Arc<dyn FoodItemGateway>,
    publisher: Arc<dyn EventPublisher>,
}

impl LogisticsService {
    pub fn new(
        config: LogisticsConfig,
        items: Arc<dyn FoodItemGateway>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            registry: RwLock::new(LogisticsRegistry::new(config)),
            items,
            publisher,
        }
    }

    fn require_receiver(actor: &Identity, operation: &'static str) -> Result<(), LogisticsError> {
        if actor.is(Role::Receiver) {
            return Ok(());
        }
        debug!(actor = %actor.id, role = %actor.role, operation, "Rejected by role check");
        Err(LogisticsError::Unauthorized {
            actor: actor.id.clone(),
            role: actor.role,
            operation,
        })
    }

    fn lookup(&self) -> impl Fn(&FoodItemId) -> Option<FoodItem> + '_ {
        move |id: &FoodItemId| self.items.food_item(id)
    }
}

impl LogisticsApi for LogisticsService {
    fn register_provider(&self, provider: LogisticsProvider) -> Result<(), LogisticsError> {
        let provider_id = provider.id.clone();
        self.registry.write().register_provider(provider)?;
        debug!(provider_id = %provider_id, "Logistics provider registered");
        Ok(())
    }

    fn register_quote(&self, quote: LogisticsQuote) -> Result<(), LogisticsError> {
        let (quote_id, lot_id, price_cents) =
            (quote.id.clone(), quote.lot_id.clone(), quote.price_cents);
        self.registry.write().register_quote(quote)?;
        debug!(quote_id = %quote_id, lot_id = %lot_id, price_cents, "Logistics quote registered");
        Ok(())
    }

    fn create_lot(
        &self,
        zone: &str,
        food_item_ids: &[FoodItemId],
    ) -> Result<ConsolidatedLot, LogisticsError> {
        let result = self
            .registry
            .write()
            .create_lot(zone, food_item_ids, self.lookup());
        let lot = result.inspect_err(|err| debug!(error = %err, "Lot creation rejected"))?;

        info!(
            lot_id = %lot.id,
            zone = %lot.zone,
            items = lot.food_item_ids.len(),
            total_quantity = lot.total_quantity,
            "Consolidated lot created"
        );
        self.publisher.publish(DonationEvent::LotCreated {
            lot_id: lot.id.clone(),
            zone: lot.zone.clone(),
            item_count: lot.food_item_ids.len(),
        });

        Ok(lot)
    }

    fn reserve_lot(
        &self,
        receiver: &Identity,
        lot_id: &LotId,
        logistics_option: LogisticsOption,
    ) -> Result<ConsolidatedLot, LogisticsError> {
        Self::require_receiver(receiver, "reserve lots")?;

        let result = self.registry.write().reserve_lot(
            lot_id,
            receiver.id.clone(),
            logistics_option,
            self.lookup(),
            |lot_id, item_ids| self.items.hold_for_lot(lot_id, item_ids),
        );
        let lot = result
            .inspect_err(|err| debug!(lot_id = %lot_id, error = %err, "Lot reservation rejected"))?;

        info!(
            lot_id = %lot_id,
            receiver_id = %receiver.id,
            logistics_option = %logistics_option,
            "Consolidated lot reserved"
        );
        self.publisher.publish(DonationEvent::LotReserved {
            lot_id: lot_id.clone(),
            receiver_id: receiver.id.clone(),
            logistics_option: logistics_option.as_str().to_string(),
        });

        Ok(lot)
    }

    fn join_shared_logistics(
        &self,
        receiver: &Identity,
        lot_id: &LotId,
    ) -> Result<ConsolidatedLot, LogisticsError> {
        Self::require_receiver(receiver, "join shared logistics")?;

        let result = self.registry.write().join(lot_id, receiver.id.clone());
        let lot = result
            .inspect_err(|err| debug!(lot_id = %lot_id, error = %err, "Join rejected"))?;

        let participants = lot.participants().len();
        info!(
            lot_id = %lot_id,
            receiver_id = %receiver.id,
            participants,
            "Receiver joined shared logistics"
        );
        self.publisher.publish(DonationEvent::SharedLogisticsJoined {
            lot_id: lot_id.clone(),
            receiver_id: receiver.id.clone(),
            participants,
        });

        Ok(lot)
    }

    fn get_lot(&self, lot_id: &LotId) -> Option<ConsolidatedLot> {
        self.registry.read().lot(lot_id).cloned()
    }

    fn get_available_lots(&self) -> Vec<ConsolidatedLot> {
        self.registry
            .read()
            .available_lots(self.lookup())
            .cloned()
            .collect()
    }

    fn get_open_shared_lots(&self) -> Vec<ConsolidatedLot> {
        self.registry.read().open_shared_lots().cloned().collect()
    }

    fn get_lots_for_receiver(&self, receiver_id: &UserId) -> Vec<ConsolidatedLot> {
        self.registry
            .read()
            .lots_for_receiver(receiver_id)
            .cloned()
            .collect()
    }

    fn get_logistics_quotes(&self, lot_id: &LotId) -> Vec<LogisticsQuote> {
        self.registry
            .read()
            .quotes_for_lot(lot_id)
            .cloned()
            .collect()
    }

    fn get_provider(&self, provider_id: &ProviderId) -> Option<LogisticsProvider> {
        self.registry.read().provider(provider_id).cloned()
    }

    fn get_providers(&self) -> Vec<LogisticsProvider> {
        self.registry.read().providers().cloned().collect()
    }

    fn cheapest_quote(&self, lot_id: &LotId) -> Option<LogisticsQuote> {
        self.registry.read().cheapest_quote(lot_id).cloned()
    }

    fn cost_share(&self, lot_id: &LotId) -> Result<CostShare, LogisticsError> {
        self.registry.read().cost_share(lot_id)
    }
}
