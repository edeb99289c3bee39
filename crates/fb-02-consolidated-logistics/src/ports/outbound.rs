//! Outbound (Driven) ports for the Consolidated Logistics subsystem.

use crate::domain::LogisticsError;
use shared_types::{FoodItem, FoodItemId, LotId};

/// Access to food items owned by the lifecycle subsystem.
///
/// Lots read item snapshots and, once reserved, hold their items so they
/// cannot be handed out a second time.
pub trait FoodItemGateway: Send + Sync {
    /// Current snapshot of a food item.
    fn food_item(&self, item_id: &FoodItemId) -> Option<FoodItem>;

    /// Holds every item for a reserved lot, or none of them.
    ///
    /// # Errors
    /// `InvalidState` if any item is unknown, not available or already held.
    fn hold_for_lot(
        &self,
        lot_id: &LotId,
        item_ids: &[FoodItemId],
    ) -> Result<(), LogisticsError>;
}

/// Fixed item catalog for testing.
#[cfg(test)]
pub struct MockFoodItemGateway {
    items: parking_lot::RwLock<std::collections::HashMap<FoodItemId, FoodItem>>,
    holds: parking_lot::RwLock<std::collections::HashMap<FoodItemId, LotId>>,
}

#[cfg(test)]
impl MockFoodItemGateway {
    pub fn new(items: impl IntoIterator<Item = FoodItem>) -> Self {
        Self {
            items: parking_lot::RwLock::new(
                items.into_iter().map(|item| (item.id.clone(), item)).collect(),
            ),
            holds: parking_lot::RwLock::new(std::collections::HashMap::new()),
        }
    }

    pub fn set_status(&self, item_id: &FoodItemId, status: shared_types::FoodItemStatus) {
        if let Some(item) = self.items.write().get_mut(item_id) {
            item.status = status;
        }
    }

    pub fn hold(&self, item_id: &FoodItemId) -> Option<LotId> {
        self.holds.read().get(item_id).cloned()
    }
}

#[cfg(test)]
impl FoodItemGateway for MockFoodItemGateway {
    fn food_item(&self, item_id: &FoodItemId) -> Option<FoodItem> {
        self.items.read().get(item_id).cloned()
    }

    fn hold_for_lot(
        &self,
        lot_id: &LotId,
        item_ids: &[FoodItemId],
    ) -> Result<(), LogisticsError> {
        let items = self.items.read();
        let mut holds = self.holds.write();
        let rejected = |reason: String| LogisticsError::InvalidState {
            lot_id: lot_id.clone(),
            reason,
        };
        for item_id in item_ids {
            let available = items
                .get(item_id)
                .is_some_and(|item| item.status == shared_types::FoodItemStatus::Available);
            if !available {
                return Err(rejected(format!("{item_id} is not available")));
            }
            if let Some(holder) = holds.get(item_id) {
                return Err(rejected(format!("{item_id} is held by {holder}")));
            }
        }
        for item_id in item_ids {
            holds.insert(item_id.clone(), lot_id.clone());
        }
        Ok(())
    }
}
