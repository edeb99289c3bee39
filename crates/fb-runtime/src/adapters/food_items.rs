//! # Food Item Adapter
//!
//! Gives the logistics subsystem access to items owned by the lifecycle
//! subsystem: snapshots for lot checks and holds for reserved lots.

use fb_01_donation_lifecycle::{LifecycleApi, LifecycleService};
use fb_02_consolidated_logistics::{FoodItemGateway, LogisticsError};
use shared_types::{FoodItem, FoodItemId, LotId};
use std::sync::Arc;

/// `FoodItemGateway` over the lifecycle service.
///
/// Each call takes the lifecycle guard only for the duration of the
/// lookup or hold. The lifecycle service never calls back into logistics, so the
/// two locks are always taken in the same order.
pub struct LifecycleItemGateway {
    lifecycle: Arc<LifecycleService>,
}

impl LifecycleItemGateway {
    pub fn new(lifecycle: Arc<LifecycleService>) -> Self {
        Self { lifecycle }
    }
}

impl FoodItemGateway for LifecycleItemGateway {
    fn food_item(&self, item_id: &FoodItemId) -> Option<FoodItem> {
        self.lifecycle.get_food_item(item_id)
    }

    fn hold_for_lot(
        &self,
        lot_id: &LotId,
        item_ids: &[FoodItemId],
    ) -> Result<(), LogisticsError> {
        self.lifecycle
            .hold_for_lot(lot_id, item_ids)
            .map_err(|err| LogisticsError::InvalidState {
                lot_id: lot_id.clone(),
                reason: err.to_string(),
            })
    }
}
