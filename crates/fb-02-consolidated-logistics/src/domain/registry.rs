//! # Logistics Registry
//!
//! Lots, providers and quotes with their indices.
//!
//! Food item state lives in the lifecycle subsystem; methods that need it
//! take a `lookup` closure so this module stays free of I/O. Reserving a
//! lot also takes a `claim` closure that holds the lot's items in the
//! lifecycle subsystem; it runs after every local check and before the lot
//! changes, so a failed claim leaves the lot untouched.
//!
//! ## Invariants Enforced
//!
//! - An item belongs to at most one lot (`lot_by_item`)
//! - A lot is reserved at most once (`reserve_lot()` checks `Available`)
//! - A reserved lot's items are claimed and cannot be reserved one by one
//! - Shared participants are unique, reserving receiver first (`join()`)
//! - Every quote references a registered provider and lot

use super::entities::{
    ConsolidatedLot, CostShare, LogisticsOption, LogisticsProvider, LogisticsQuote, LotState,
};
use super::errors::LogisticsError;
use super::services;
use crate::config::LogisticsConfig;
use shared_types::{FoodItem, FoodItemId, LotId, ProviderId, QuoteId, UserId, ValidationError};
use std::collections::{HashMap, HashSet};

const MIN_RATING: u8 = 1;
const MAX_RATING: u8 = 5;

/// In-memory logistics reference data and lot reservations.
#[derive(Debug, Default)]
pub struct LogisticsRegistry {
    config: LogisticsConfig,

    lots: HashMap<LotId, ConsolidatedLot>,
    lot_order: Vec<LotId>,
    lot_by_item: HashMap<FoodItemId, LotId>,

    providers: HashMap<ProviderId, LogisticsProvider>,
    provider_order: Vec<ProviderId>,

    quotes: HashMap<QuoteId, LogisticsQuote>,
    quotes_by_lot: HashMap<LotId, Vec<QuoteId>>,
}

impl LogisticsRegistry {
    pub fn new(config: LogisticsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LogisticsConfig {
        &self.config
    }

    pub fn lot_count(&self) -> usize {
        self.lots.len()
    }

    // =========================================================================
    // REFERENCE DATA
    // =========================================================================

    /// Registers a logistics provider.
    ///
    /// # Errors
    /// - `Validation` for a blank name or contact, or a rating outside 1..=5
    /// - `DuplicateProvider` if the id is taken
    pub fn register_provider(
        &mut self,
        provider: LogisticsProvider,
    ) -> Result<(), LogisticsError> {
        non_blank("name", &provider.name)?;
        non_blank("contact", &provider.contact)?;
        if !(MIN_RATING..=MAX_RATING).contains(&provider.rating) {
            return Err(ValidationError::OutOfRange {
                field: "rating",
                value: u64::from(provider.rating),
                min: u64::from(MIN_RATING),
                max: u64::from(MAX_RATING),
            }
            .into());
        }
        if self.providers.contains_key(&provider.id) {
            return Err(LogisticsError::DuplicateProvider(provider.id));
        }

        self.provider_order.push(provider.id.clone());
        self.providers.insert(provider.id.clone(), provider);
        Ok(())
    }

    /// Registers a quote for an existing lot from an existing provider.
    ///
    /// # Errors
    /// - `Validation` for a blank vehicle or a zero price
    /// - `ProviderNotFound` / `LotNotFound` for dangling references
    /// - `DuplicateQuote` if the id is taken
    pub fn register_quote(&mut self, quote: LogisticsQuote) -> Result<(), LogisticsError> {
        non_blank("vehicle", &quote.vehicle)?;
        if quote.price_cents == 0 {
            return Err(ValidationError::OutOfRange {
                field: "price_cents",
                value: 0,
                min: 1,
                max: u64::MAX,
            }
            .into());
        }
        if !self.providers.contains_key(&quote.provider_id) {
            return Err(LogisticsError::ProviderNotFound(quote.provider_id));
        }
        if !self.lots.contains_key(&quote.lot_id) {
            return Err(LogisticsError::LotNotFound(quote.lot_id));
        }
        if self.quotes.contains_key(&quote.id) {
            return Err(LogisticsError::DuplicateQuote(quote.id));
        }

        self.quotes_by_lot
            .entry(quote.lot_id.clone())
            .or_default()
            .push(quote.id.clone());
        self.quotes.insert(quote.id.clone(), quote);
        Ok(())
    }

    // =========================================================================
    // LOTS
    // =========================================================================

    /// Groups available food items of one zone into a new lot.
    ///
    /// # Errors
    /// - `Validation` for a blank zone, an empty list or duplicate ids
    /// - `TooManyItems` above the configured limit
    /// - `FoodItemNotFound`, `ItemUnavailable`, `ItemAlreadyInLot` per item
    pub fn create_lot(
        &mut self,
        zone: &str,
        food_item_ids: &[FoodItemId],
        lookup: impl Fn(&FoodItemId) -> Option<FoodItem>,
    ) -> Result<ConsolidatedLot, LogisticsError> {
        let zone = zone.trim();
        non_blank("zone", zone)?;
        let zone_len = zone.chars().count();
        if zone_len > self.config.max_zone_len {
            return Err(ValidationError::FieldTooLong {
                field: "zone",
                len: zone_len,
                max: self.config.max_zone_len,
            }
            .into());
        }
        if food_item_ids.is_empty() {
            return Err(ValidationError::EmptyList {
                field: "food_item_ids",
            }
            .into());
        }
        if food_item_ids.len() > self.config.max_items_per_lot {
            return Err(LogisticsError::TooManyItems {
                count: food_item_ids.len(),
                max: self.config.max_items_per_lot,
            });
        }

        let mut seen = HashSet::with_capacity(food_item_ids.len());
        let mut total_quantity: u64 = 0;
        for item_id in food_item_ids {
            if !seen.insert(item_id) {
                return Err(ValidationError::DuplicateEntry {
                    field: "food_item_ids",
                    value: item_id.to_string(),
                }
                .into());
            }
            if let Some(lot_id) = self.lot_by_item.get(item_id) {
                return Err(LogisticsError::ItemAlreadyInLot {
                    item_id: item_id.clone(),
                    lot_id: lot_id.clone(),
                });
            }
            let item = require_available(item_id, &lookup)?;
            total_quantity += u64::from(item.quantity);
        }

        let id = LotId::new(format!("lot-{}", self.lots.len() + 1));
        let lot = ConsolidatedLot {
            id: id.clone(),
            zone: zone.to_string(),
            food_item_ids: food_item_ids.to_vec(),
            total_quantity,
            state: LotState::Available,
        };

        for item_id in food_item_ids {
            self.lot_by_item.insert(item_id.clone(), id.clone());
        }
        self.lots.insert(id.clone(), lot.clone());
        self.lot_order.push(id);

        Ok(lot)
    }

    /// Reserves an available lot. First writer wins.
    ///
    /// # Errors
    /// - `LotNotFound` for an unknown lot
    /// - `InvalidState` if the lot is already reserved or one of its items
    ///   was reserved individually since the lot was formed
    /// - Whatever `claim` returns when the items cannot be held for the lot
    pub fn reserve_lot(
        &mut self,
        lot_id: &LotId,
        receiver_id: UserId,
        logistics_option: LogisticsOption,
        lookup: impl Fn(&FoodItemId) -> Option<FoodItem>,
        claim: impl FnOnce(&LotId, &[FoodItemId]) -> Result<(), LogisticsError>,
    ) -> Result<ConsolidatedLot, LogisticsError> {
        let lot = self
            .lots
            .get(lot_id)
            .ok_or_else(|| LogisticsError::LotNotFound(lot_id.clone()))?;

        if let Some(holder) = lot.receiver_id() {
            return Err(LogisticsError::InvalidState {
                lot_id: lot_id.clone(),
                reason: format!("already reserved by {holder}"),
            });
        }
        for item_id in &lot.food_item_ids {
            require_available(item_id, &lookup).map_err(|err| LogisticsError::InvalidState {
                lot_id: lot_id.clone(),
                reason: err.to_string(),
            })?;
        }
        claim(lot_id, &lot.food_item_ids)?;

        let lot = self
            .lots
            .get_mut(lot_id)
            .ok_or_else(|| LogisticsError::LotNotFound(lot_id.clone()))?;
        lot.state = LotState::Reserved {
            receiver_id: receiver_id.clone(),
            logistics_option,
            participants: vec![receiver_id],
        };

        Ok(lot.clone())
    }

    /// Adds a receiver to a lot reserved with shared logistics.
    ///
    /// # Errors
    /// - `LotNotFound` for an unknown lot
    /// - `InvalidState` if the lot is unreserved or reserved without sharing
    /// - `AlreadyParticipating` if the receiver is already in
    /// - `ParticipantLimit` once the configured maximum is reached
    pub fn join(
        &mut self,
        lot_id: &LotId,
        receiver_id: UserId,
    ) -> Result<ConsolidatedLot, LogisticsError> {
        let max = self.config.max_shared_participants;
        let lot = self
            .lots
            .get_mut(lot_id)
            .ok_or_else(|| LogisticsError::LotNotFound(lot_id.clone()))?;

        let participants = match &mut lot.state {
            LotState::Available => {
                return Err(LogisticsError::InvalidState {
                    lot_id: lot_id.clone(),
                    reason: "not reserved yet".to_string(),
                })
            }
            LotState::Reserved {
                logistics_option: LogisticsOption::BeneficiaryCovers,
                ..
            } => {
                return Err(LogisticsError::InvalidState {
                    lot_id: lot_id.clone(),
                    reason: "reserved without shared logistics".to_string(),
                })
            }
            LotState::Reserved { participants, .. } => participants,
        };

        if participants.contains(&receiver_id) {
            return Err(LogisticsError::AlreadyParticipating {
                lot_id: lot_id.clone(),
                receiver_id,
            });
        }
        if participants.len() >= max {
            return Err(LogisticsError::ParticipantLimit {
                lot_id: lot_id.clone(),
                max,
            });
        }

        participants.push(receiver_id);
        Ok(lot.clone())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn lot(&self, lot_id: &LotId) -> Option<&ConsolidatedLot> {
        self.lots.get(lot_id)
    }

    pub fn provider(&self, provider_id: &ProviderId) -> Option<&LogisticsProvider> {
        self.providers.get(provider_id)
    }

    pub fn providers(&self) -> impl Iterator<Item = &LogisticsProvider> + '_ {
        self.provider_order
            .iter()
            .filter_map(move |id| self.providers.get(id))
    }

    /// Unreserved lots whose items are all still available.
    pub fn available_lots<'a>(
        &'a self,
        lookup: impl Fn(&FoodItemId) -> Option<FoodItem> + 'a,
    ) -> impl Iterator<Item = &'a ConsolidatedLot> + 'a {
        self.lots_in_order().filter(move |lot| {
            lot.is_available()
                && lot
                    .food_item_ids
                    .iter()
                    .all(|id| lookup(id).is_some_and(|item| item.is_available()))
        })
    }

    /// Shared lots that still have room for another receiver.
    pub fn open_shared_lots(&self) -> impl Iterator<Item = &ConsolidatedLot> + '_ {
        let max = self.config.max_shared_participants;
        self.lots_in_order().filter(move |lot| {
            lot.logistics_option() == Some(LogisticsOption::SharedLogistics)
                && lot.participants().len() < max
        })
    }

    /// Lots the receiver reserved or joined.
    pub fn lots_for_receiver<'a>(
        &'a self,
        receiver_id: &'a UserId,
    ) -> impl Iterator<Item = &'a ConsolidatedLot> + 'a {
        self.lots_in_order()
            .filter(move |lot| lot.participants().contains(receiver_id))
    }

    /// Quotes for a lot in registration order.
    pub fn quotes_for_lot(&self, lot_id: &LotId) -> impl Iterator<Item = &LogisticsQuote> + '_ {
        self.quotes_by_lot
            .get(lot_id)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .filter_map(move |id| self.quotes.get(id))
    }

    pub fn cheapest_quote(&self, lot_id: &LotId) -> Option<&LogisticsQuote> {
        services::cheapest_quote(self.quotes_for_lot(lot_id))
    }

    /// Splits the cheapest quote across the lot's paying receivers.
    ///
    /// # Errors
    /// - `LotNotFound` for an unknown lot
    /// - `NoQuotes` if no quote was registered for it
    pub fn cost_share(&self, lot_id: &LotId) -> Result<CostShare, LogisticsError> {
        let lot = self
            .lots
            .get(lot_id)
            .ok_or_else(|| LogisticsError::LotNotFound(lot_id.clone()))?;
        let quote = self
            .cheapest_quote(lot_id)
            .ok_or_else(|| LogisticsError::NoQuotes(lot_id.clone()))?;
        Ok(services::cost_share(lot, quote))
    }

    fn lots_in_order(&self) -> impl Iterator<Item = &ConsolidatedLot> + '_ {
        self.lot_order.iter().filter_map(move |id| self.lots.get(id))
    }
}

fn non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

fn require_available(
    item_id: &FoodItemId,
    lookup: &impl Fn(&FoodItemId) -> Option<FoodItem>,
) -> Result<FoodItem, LogisticsError> {
    let item = lookup(item_id).ok_or_else(|| LogisticsError::FoodItemNotFound(item_id.clone()))?;
    if !item.is_available() {
        return Err(LogisticsError::ItemUnavailable {
            item_id: item_id.clone(),
            status: item.status,
        });
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::FoodItemStatus;

    fn food(id: &str, quantity: u32, status: FoodItemStatus) -> FoodItem {
        FoodItem {
            id: FoodItemId::new(id),
            donor_id: UserId::new("d-1"),
            name: "Rice".to_string(),
            quantity,
            unit: "kg".to_string(),
            expiration_date: u64::MAX,
            donor_address: "Main St 1".to_string(),
            status,
            created_at: 0,
        }
    }

    fn catalog() -> HashMap<FoodItemId, FoodItem> {
        [
            food("food-1", 10, FoodItemStatus::Available),
            food("food-2", 5, FoodItemStatus::Available),
            food("food-3", 7, FoodItemStatus::Reserved),
            food("food-4", 1, FoodItemStatus::Available),
        ]
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect()
    }

    fn ids(raw: &[&str]) -> Vec<FoodItemId> {
        raw.iter().map(|id| FoodItemId::new(*id)).collect()
    }

    fn provider(id: &str) -> LogisticsProvider {
        LogisticsProvider {
            id: ProviderId::new(id),
            name: "FastVan".to_string(),
            contact: "ops@fastvan.example".to_string(),
            rating: 4,
        }
    }

    fn quote(id: &str, lot: &str, price_cents: u64) -> LogisticsQuote {
        LogisticsQuote {
            id: QuoteId::new(id),
            provider_id: ProviderId::new("prov-1"),
            lot_id: LotId::new(lot),
            price_cents,
            estimated_hours: 4,
            vehicle: "van".to_string(),
        }
    }

    fn no_claim(_: &LotId, _: &[FoodItemId]) -> Result<(), LogisticsError> {
        Ok(())
    }

    fn registry_with_lot() -> (LogisticsRegistry, HashMap<FoodItemId, FoodItem>) {
        let items = catalog();
        let mut registry = LogisticsRegistry::new(LogisticsConfig::for_testing());
        registry
            .create_lot("north", &ids(&["food-1", "food-2"]), |id| items.get(id).cloned())
            .unwrap();
        (registry, items)
    }

    #[test]
    fn test_create_lot_sums_quantities() {
        let (registry, _) = registry_with_lot();
        let lot = registry.lot(&LotId::new("lot-1")).unwrap();
        assert_eq!(lot.total_quantity, 15);
        assert_eq!(lot.zone, "north");
        assert!(lot.is_available());
    }

    #[test]
    fn test_create_lot_rejects_bad_items() {
        let (mut registry, items) = registry_with_lot();
        let lookup = |id: &FoodItemId| items.get(id).cloned();

        assert!(matches!(
            registry.create_lot("south", &ids(&["food-3"]), lookup),
            Err(LogisticsError::ItemUnavailable { .. })
        ));
        assert!(matches!(
            registry.create_lot("south", &ids(&["food-9"]), lookup),
            Err(LogisticsError::FoodItemNotFound(_))
        ));
        assert!(matches!(
            registry.create_lot("south", &ids(&["food-1"]), lookup),
            Err(LogisticsError::ItemAlreadyInLot { .. })
        ));
        assert!(matches!(
            registry.create_lot("south", &ids(&["food-4", "food-4"]), lookup),
            Err(LogisticsError::Validation(ValidationError::DuplicateEntry { .. }))
        ));
        assert!(matches!(
            registry.create_lot("  ", &ids(&["food-4"]), lookup),
            Err(LogisticsError::Validation(ValidationError::EmptyField { field: "zone" }))
        ));
        assert!(matches!(
            registry.create_lot("south", &[], lookup),
            Err(LogisticsError::Validation(ValidationError::EmptyList { .. }))
        ));
        assert_eq!(registry.lot_count(), 1);
    }

    #[test]
    fn test_reserve_lot_first_writer_wins() {
        let (mut registry, items) = registry_with_lot();
        let lot_id = LotId::new("lot-1");
        let lookup = |id: &FoodItemId| items.get(id).cloned();

        let lot = registry
            .reserve_lot(
                &lot_id,
                UserId::new("r-1"),
                LogisticsOption::SharedLogistics,
                lookup,
                no_claim,
            )
            .unwrap();
        assert_eq!(lot.participants(), &[UserId::new("r-1")]);

        let second = registry.reserve_lot(
            &lot_id,
            UserId::new("r-2"),
            LogisticsOption::BeneficiaryCovers,
            lookup,
            no_claim,
        );
        assert!(matches!(second, Err(LogisticsError::InvalidState { .. })));
        assert_eq!(
            registry.lot(&lot_id).unwrap().receiver_id(),
            Some(&UserId::new("r-1"))
        );
    }

    #[test]
    fn test_reserve_lot_with_item_taken_individually() {
        let (mut registry, mut items) = registry_with_lot();
        if let Some(item) = items.get_mut(&FoodItemId::new("food-2")) {
            item.status = FoodItemStatus::Reserved;
        }
        let lookup = |id: &FoodItemId| items.get(id).cloned();

        assert_eq!(registry.available_lots(lookup).count(), 0);
        let result = registry.reserve_lot(
            &LotId::new("lot-1"),
            UserId::new("r-1"),
            LogisticsOption::BeneficiaryCovers,
            lookup,
            no_claim,
        );
        assert!(matches!(result, Err(LogisticsError::InvalidState { .. })));
    }

    #[test]
    fn test_failed_claim_leaves_lot_available() {
        let (mut registry, items) = registry_with_lot();
        let lot_id = LotId::new("lot-1");
        let mut claimed = Vec::new();

        let result = registry.reserve_lot(
            &lot_id,
            UserId::new("r-1"),
            LogisticsOption::BeneficiaryCovers,
            |id| items.get(id).cloned(),
            |lot, item_ids| {
                claimed.extend_from_slice(item_ids);
                Err(LogisticsError::InvalidState {
                    lot_id: lot.clone(),
                    reason: "item held elsewhere".to_string(),
                })
            },
        );

        assert!(matches!(result, Err(LogisticsError::InvalidState { .. })));
        assert_eq!(claimed, ids(&["food-1", "food-2"]));
        assert!(registry.lot(&lot_id).unwrap().is_available());
    }

    #[test]
    fn test_join_shared_logistics() {
        let (mut registry, items) = registry_with_lot();
        let lot_id = LotId::new("lot-1");
        registry
            .reserve_lot(
                &lot_id,
                UserId::new("r-1"),
                LogisticsOption::SharedLogistics,
                |id| items.get(id).cloned(),
                no_claim,
            )
            .unwrap();

        let lot = registry.join(&lot_id, UserId::new("r-2")).unwrap();
        assert_eq!(lot.participants(), &[UserId::new("r-1"), UserId::new("r-2")]);

        assert!(matches!(
            registry.join(&lot_id, UserId::new("r-2")),
            Err(LogisticsError::AlreadyParticipating { .. })
        ));
        assert!(matches!(
            registry.join(&lot_id, UserId::new("r-1")),
            Err(LogisticsError::AlreadyParticipating { .. })
        ));

        registry.join(&lot_id, UserId::new("r-3")).unwrap();
        assert_eq!(
            registry.join(&lot_id, UserId::new("r-4")),
            Err(LogisticsError::ParticipantLimit { lot_id: lot_id.clone(), max: 3 })
        );
        assert_eq!(registry.open_shared_lots().count(), 0);
        assert_eq!(registry.lots_for_receiver(&UserId::new("r-3")).count(), 1);
    }

    #[test]
    fn test_join_requires_shared_reservation() {
        let (mut registry, items) = registry_with_lot();
        let lot_id = LotId::new("lot-1");

        assert!(matches!(
            registry.join(&lot_id, UserId::new("r-2")),
            Err(LogisticsError::InvalidState { .. })
        ));

        registry
            .reserve_lot(
                &lot_id,
                UserId::new("r-1"),
                LogisticsOption::BeneficiaryCovers,
                |id| items.get(id).cloned(),
                no_claim,
            )
            .unwrap();
        assert!(matches!(
            registry.join(&lot_id, UserId::new("r-2")),
            Err(LogisticsError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_quotes_and_cost_share() {
        let (mut registry, items) = registry_with_lot();
        let lot_id = LotId::new("lot-1");

        assert!(matches!(
            registry.register_quote(quote("q-1", "lot-1", 9_000)),
            Err(LogisticsError::ProviderNotFound(_))
        ));
        registry.register_provider(provider("prov-1")).unwrap();
        assert!(matches!(
            registry.register_provider(provider("prov-1")),
            Err(LogisticsError::DuplicateProvider(_))
        ));
        assert!(matches!(
            registry.register_quote(quote("q-1", "lot-9", 9_000)),
            Err(LogisticsError::LotNotFound(_))
        ));

        assert_eq!(
            registry.cost_share(&lot_id),
            Err(LogisticsError::NoQuotes(lot_id.clone()))
        );

        registry.register_quote(quote("q-1", "lot-1", 9_000)).unwrap();
        registry.register_quote(quote("q-2", "lot-1", 10_000)).unwrap();
        assert_eq!(registry.quotes_for_lot(&lot_id).count(), 2);
        assert_eq!(
            registry.cheapest_quote(&lot_id).unwrap().id,
            QuoteId::new("q-1")
        );

        registry
            .reserve_lot(
                &lot_id,
                UserId::new("r-1"),
                LogisticsOption::SharedLogistics,
                |id| items.get(id).cloned(),
                no_claim,
            )
            .unwrap();
        registry.join(&lot_id, UserId::new("r-2")).unwrap();
        registry.join(&lot_id, UserId::new("r-3")).unwrap();

        let share = registry.cost_share(&lot_id).unwrap();
        assert_eq!(share.total_cents, 9_000);
        assert_eq!(share.participants, 3);
        assert_eq!(share.per_participant_cents, 3_000);
    }

    #[test]
    fn test_provider_rating_range() {
        let mut registry = LogisticsRegistry::default();
        let mut bad = provider("prov-2");
        bad.rating = 6;
        assert!(matches!(
            registry.register_provider(bad),
            Err(LogisticsError::Validation(ValidationError::OutOfRange { field: "rating", .. }))
        ));
        assert_eq!(registry.providers().count(), 0);
    }
}
