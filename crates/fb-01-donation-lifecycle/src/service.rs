//! Donation Lifecycle Service
//!
//! Implements `LifecycleApi` over a `LifecycleStore` guarded by one
//! `RwLock`. Each mutating call:
//! 1. Checks the actor's role
//! 2. Takes the write guard, runs the store's check-and-mutate, drops the guard
//! 3. Publishes the matching `DonationEvent`

use crate::config::LifecycleConfig;
use crate::domain::{
    Donation, DonationStatus, LifecycleError, LifecycleStatus, LifecycleStore, NewFoodItem,
    TaxCertificate,
};
use crate::ports::{IdGenerator, LifecycleApi, SystemTimeSource, TimeSource, UuidIdGenerator};
use parking_lot::RwLock;
use shared_bus::{DonationEvent, EventPublisher};
use shared_types::{
    CertificateId, DonationId, FoodItem, FoodItemId, Identity, LotId, Role, UserId,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Owns all lifecycle state.
pub struct LifecycleService {
    store: RwLock<LifecycleStore>,
    time: Arc<dyn TimeSource>,
    ids: Arc<dyn IdGenerator>,
    publisher: Arc<dyn EventPublisher>,
}

impl LifecycleService {
    /// Service on wall-clock time with random identifiers.
    pub fn new(config: LifecycleConfig, publisher: Arc<dyn EventPublisher>) -> Self {
        Self::with_ports(
            config,
            Arc::new(SystemTimeSource),
            Arc::new(UuidIdGenerator),
            publisher,
        )
    }

    pub fn with_ports(
        config: LifecycleConfig,
        time: Arc<dyn TimeSource>,
        ids: Arc<dyn IdGenerator>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            store: RwLock::new(LifecycleStore::new(config)),
            time,
            ids,
            publisher,
        }
    }

    pub fn config(&self) -> LifecycleConfig {
        self.store.read().config().clone()
    }

    /// Runs `f` against a consistent read-only view of the store.
    pub fn with_store<R>(&self, f: impl FnOnce(&LifecycleStore) -> R) -> R {
        f(&*self.store.read())
    }

    fn require_role(
        actor: &Identity,
        role: Role,
        operation: &'static str,
    ) -> Result<(), LifecycleError> {
        if actor.is(role) {
            return Ok(());
        }
        debug!(actor = %actor.id, role = %actor.role, operation, "Rejected by role check");
        Err(LifecycleError::Unauthorized {
            actor: actor.id.clone(),
            role: actor.role,
            operation,
        })
    }

    fn rejected<T>(
        operation: &'static str,
        result: Result<T, LifecycleError>,
    ) -> Result<T, LifecycleError> {
        if let Err(err) = &result {
            debug!(operation, error = %err, "Lifecycle operation rejected");
        }
        result
    }
}

impl LifecycleApi for LifecycleService {
    fn publish_food_item(
        &self,
        donor: &Identity,
        attrs: NewFoodItem,
    ) -> Result<FoodItem, LifecycleError> {
        Self::require_role(donor, Role::Donor, "publish food items")?;
        let now = self.time.now();

        let result = self.store.write().publish(donor.id.clone(), attrs, now, || {
            FoodItemId::new(self.ids.next_id("food"))
        });
        let item = Self::rejected("publish_food_item", result)?;

        info!(
            item_id = %item.id,
            donor_id = %item.donor_id,
            quantity = item.quantity,
            unit = %item.unit,
            "Food item published"
        );
        self.publisher.publish(DonationEvent::FoodItemPublished {
            item_id: item.id.clone(),
            donor_id: item.donor_id.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
        });

        Ok(item)
    }

    fn reserve_food_item(
        &self,
        receiver: &Identity,
        item_id: &FoodItemId,
    ) -> Result<Donation, LifecycleError> {
        Self::require_role(receiver, Role::Receiver, "reserve food items")?;
        let now = self.time.now();

        let result = self.store.write().reserve(item_id, receiver.id.clone(), now, || {
            DonationId::new(self.ids.next_id("don"))
        });
        let donation = Self::rejected("reserve_food_item", result)?;

        info!(
            item_id = %item_id,
            donation_id = %donation.id,
            receiver_id = %receiver.id,
            "Food item reserved"
        );
        self.publisher.publish(DonationEvent::FoodItemReserved {
            item_id: item_id.clone(),
            donation_id: donation.id.clone(),
            receiver_id: receiver.id.clone(),
        });

        Ok(donation)
    }

    fn assign_volunteer(
        &self,
        volunteer: &Identity,
        donation_id: &DonationId,
    ) -> Result<Donation, LifecycleError> {
        Self::require_role(volunteer, Role::Volunteer, "take deliveries")?;

        let result = self
            .store
            .write()
            .assign_volunteer(donation_id, volunteer.id.clone());
        let donation = Self::rejected("assign_volunteer", result)?;

        info!(
            donation_id = %donation_id,
            volunteer_id = %volunteer.id,
            "Volunteer assigned"
        );
        self.publisher.publish(DonationEvent::VolunteerAssigned {
            donation_id: donation_id.clone(),
            volunteer_id: volunteer.id.clone(),
        });

        Ok(donation)
    }

    fn update_donation_status(
        &self,
        actor: &Identity,
        donation_id: &DonationId,
        new_status: DonationStatus,
    ) -> Result<Donation, LifecycleError> {
        Self::require_role(actor, Role::Volunteer, "update donation status")?;

        let result = self.store.write().advance(donation_id, &actor.id, new_status);
        let (donation, from) = Self::rejected("update_donation_status", result)?;

        info!(
            donation_id = %donation_id,
            from = %from,
            to = %donation.status,
            "Donation status changed"
        );
        self.publisher.publish(DonationEvent::DonationStatusChanged {
            donation_id: donation_id.clone(),
            from: from.as_str().to_string(),
            to: donation.status.as_str().to_string(),
        });

        Ok(donation)
    }

    fn generate_tax_certificate(
        &self,
        donor: &Identity,
        donation_ids: &[DonationId],
    ) -> Result<TaxCertificate, LifecycleError> {
        Self::require_role(donor, Role::Donor, "request tax certificates")?;
        let now = self.time.now();

        let result = self
            .store
            .write()
            .issue_certificate(&donor.id, donation_ids, now, || {
                CertificateId::new(self.ids.next_id("cert"))
            });
        let certificate = Self::rejected("generate_tax_certificate", result)?;

        info!(
            certificate_id = %certificate.id,
            donor_id = %donor.id,
            donations = certificate.donation_ids.len(),
            total_items = certificate.total_items,
            "Tax certificate generated"
        );
        self.publisher.publish(DonationEvent::TaxCertificateGenerated {
            certificate_id: certificate.id.clone(),
            donor_id: donor.id.clone(),
            donation_ids: certificate.donation_ids.clone(),
        });

        Ok(certificate)
    }

    fn hold_for_lot(
        &self,
        lot_id: &LotId,
        item_ids: &[FoodItemId],
    ) -> Result<(), LifecycleError> {
        let now = self.time.now();
        let result = self.store.write().hold_for_lot(lot_id, item_ids, now);
        Self::rejected("hold_for_lot", result)?;

        info!(lot_id = %lot_id, items = item_ids.len(), "Food items held for lot");
        Ok(())
    }

    fn expire_food_items(&self) -> Vec<FoodItemId> {
        let now = self.time.now();
        let expired = self.store.write().expire_due(now);

        if !expired.is_empty() {
            info!(count = expired.len(), at = now, "Food items expired");
            self.publisher.publish(DonationEvent::FoodItemsExpired {
                item_ids: expired.clone(),
                at: now,
            });
        }

        expired
    }

    fn get_food_item(&self, item_id: &FoodItemId) -> Option<FoodItem> {
        self.store.read().food_item(item_id).cloned()
    }

    fn get_donation(&self, donation_id: &DonationId) -> Option<Donation> {
        self.store.read().donation(donation_id).cloned()
    }

    fn get_lot_hold(&self, item_id: &FoodItemId) -> Option<LotId> {
        self.store.read().lot_hold(item_id).cloned()
    }

    fn get_donation_for_item(&self, item_id: &FoodItemId) -> Option<Donation> {
        self.store.read().donation_for_item(item_id).cloned()
    }

    fn get_available_food_items(&self) -> Vec<FoodItem> {
        let now = self.time.now();
        self.store.read().available_items(now).cloned().collect()
    }

    fn get_food_items_by_donor(&self, donor_id: &UserId) -> Vec<FoodItem> {
        self.store.read().items_by_donor(donor_id).cloned().collect()
    }

    fn get_food_items_by_receiver(&self, receiver_id: &UserId) -> Vec<FoodItem> {
        self.store
            .read()
            .items_by_receiver(receiver_id)
            .cloned()
            .collect()
    }

    fn get_donations_by_volunteer(&self, volunteer_id: &UserId) -> Vec<Donation> {
        self.store
            .read()
            .donations_by_volunteer(volunteer_id)
            .cloned()
            .collect()
    }

    fn get_available_deliveries(&self) -> Vec<Donation> {
        self.store.read().available_deliveries().cloned().collect()
    }

    fn get_uncertified_donations(&self, donor_id: &UserId) -> Vec<Donation> {
        self.store
            .read()
            .uncertified_donations(donor_id)
            .cloned()
            .collect()
    }

    fn get_tax_certificates_by_donor(&self, donor_id: &UserId) -> Vec<TaxCertificate> {
        self.store
            .read()
            .certificates_by_donor(donor_id)
            .cloned()
            .collect()
    }

    fn get_status(&self) -> LifecycleStatus {
        self.store.read().status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invariants::check_all;
    use crate::domain::Ineligibility;
    use crate::ports::{ManualTimeSource, SequentialIdGenerator};
    use proptest::prelude::*;
    use shared_bus::{EventFilter, InMemoryEventBus, NoopPublisher};
    use shared_types::{FoodItemStatus, DAY_MS};
    use std::thread;

    const START: u64 = 100 * DAY_MS;

    struct Harness {
        service: Arc<LifecycleService>,
        time: Arc<ManualTimeSource>,
        bus: Arc<InMemoryEventBus>,
    }

    fn harness() -> Harness {
        let time = Arc::new(ManualTimeSource::new(START));
        let bus = Arc::new(InMemoryEventBus::new());
        let service = Arc::new(LifecycleService::with_ports(
            LifecycleConfig::for_testing(),
            time.clone(),
            Arc::new(SequentialIdGenerator::new()),
            bus.clone(),
        ));
        Harness { service, time, bus }
    }

    fn quiet_service() -> LifecycleService {
        LifecycleService::with_ports(
            LifecycleConfig::for_testing(),
            Arc::new(ManualTimeSource::new(START)),
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(NoopPublisher),
        )
    }

    fn apples(quantity: u32) -> NewFoodItem {
        NewFoodItem {
            name: "Apples".to_string(),
            quantity,
            unit: "kg".to_string(),
            expiration_date: START + 3 * DAY_MS,
            donor_address: "1 Orchard Lane".to_string(),
        }
    }

    fn donor() -> Identity {
        Identity::donor("d-1")
    }

    fn receiver() -> Identity {
        Identity::receiver("r-1")
    }

    fn volunteer() -> Identity {
        Identity::volunteer("v-1")
    }

    fn reserved_donation(service: &LifecycleService) -> Donation {
        let item = service.publish_food_item(&donor(), apples(10)).unwrap();
        service.reserve_food_item(&receiver(), &item.id).unwrap()
    }

    #[test]
    fn test_full_donation_scenario() {
        let h = harness();
        let mut events = h.bus.subscribe(EventFilter::all());
        let service = &h.service;

        let item = service.publish_food_item(&donor(), apples(10)).unwrap();
        assert_eq!(item.id, FoodItemId::new("food-1"));
        assert_eq!(service.get_available_food_items(), vec![item.clone()]);

        let donation = service.reserve_food_item(&receiver(), &item.id).unwrap();
        assert_eq!(donation.status, DonationStatus::Confirmed);
        assert_eq!(donation.receiver_id, Some(receiver().id));
        assert_eq!(
            service.get_food_item(&item.id).unwrap().status,
            FoodItemStatus::Reserved
        );
        assert!(service.get_available_food_items().is_empty());
        assert_eq!(service.get_available_deliveries(), vec![donation.clone()]);

        service.assign_volunteer(&volunteer(), &donation.id).unwrap();
        assert!(service.get_available_deliveries().is_empty());

        service
            .update_donation_status(&volunteer(), &donation.id, DonationStatus::InTransit)
            .unwrap();
        let delivered = service
            .update_donation_status(&volunteer(), &donation.id, DonationStatus::Delivered)
            .unwrap();
        assert_eq!(delivered.status, DonationStatus::Delivered);
        assert_eq!(
            service.get_food_item(&item.id).unwrap().status,
            FoodItemStatus::Delivered
        );

        assert_eq!(service.get_uncertified_donations(&donor().id).len(), 1);
        let certificate = service
            .generate_tax_certificate(&donor(), &[donation.id.clone()])
            .unwrap();
        assert_eq!(certificate.total_items, 10);
        assert_eq!(
            service.get_donation(&donation.id).unwrap().tax_certificate_id,
            Some(certificate.id.clone())
        );
        assert!(service.get_uncertified_donations(&donor().id).is_empty());
        assert_eq!(
            service.get_tax_certificates_by_donor(&donor().id),
            vec![certificate]
        );

        let topics: Vec<_> = events.drain().iter().map(|e| e.topic()).collect();
        assert_eq!(topics.len(), 6);
        assert!(service.with_store(check_all).is_ok());
    }

    #[test]
    fn test_concurrent_reservations_single_winner() {
        let service = Arc::new(quiet_service());
        let item = service.publish_food_item(&donor(), apples(10)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let service = service.clone();
                let item_id = item.id.clone();
                thread::spawn(move || {
                    service.reserve_food_item(&Identity::receiver(format!("r-{i}")), &item_id)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        let losers = results
            .iter()
            .filter(|r| matches!(r, Err(LifecycleError::InvalidState { .. })))
            .count();

        assert_eq!(winners, 1);
        assert_eq!(losers, 7);
        assert_eq!(service.get_status().total_donations(), 1);
        assert!(service.with_store(check_all).is_ok());
    }

    #[test]
    fn test_concurrent_volunteers_single_assignment() {
        let service = Arc::new(quiet_service());
        let donation = reserved_donation(&service);

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let service = service.clone();
                let donation_id = donation.id.clone();
                thread::spawn(move || {
                    service.assign_volunteer(&Identity::volunteer(format!("v-{i}")), &donation_id)
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();
        assert_eq!(winners, 1);
        assert!(service.get_donation(&donation.id).unwrap().volunteer_id.is_some());
    }

    #[test]
    fn test_assign_twice_leaves_state_unchanged() {
        let service = quiet_service();
        let donation = reserved_donation(&service);
        service.assign_volunteer(&volunteer(), &donation.id).unwrap();
        let before = service.get_donation(&donation.id).unwrap();

        let result = service.assign_volunteer(&Identity::volunteer("v-2"), &donation.id);

        assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
        assert_eq!(service.get_donation(&donation.id).unwrap(), before);
        assert!(service
            .get_donations_by_volunteer(&UserId::new("v-2"))
            .is_empty());
    }

    #[test]
    fn test_confirmed_to_delivered_is_invalid_transition() {
        let service = quiet_service();
        let donation = reserved_donation(&service);
        service.assign_volunteer(&volunteer(), &donation.id).unwrap();

        let result =
            service.update_donation_status(&volunteer(), &donation.id, DonationStatus::Delivered);

        assert!(matches!(
            result,
            Err(LifecycleError::InvalidTransition {
                from: DonationStatus::Confirmed,
                to: DonationStatus::Delivered,
                ..
            })
        ));
    }

    #[test]
    fn test_overlapping_certificate_requests() {
        let service = quiet_service();
        let first = reserved_donation(&service);
        let second = reserved_donation(&service);
        for donation in [&first, &second] {
            service.assign_volunteer(&volunteer(), &donation.id).unwrap();
            service
                .update_donation_status(&volunteer(), &donation.id, DonationStatus::InTransit)
                .unwrap();
            service
                .update_donation_status(&volunteer(), &donation.id, DonationStatus::Delivered)
                .unwrap();
        }

        service
            .generate_tax_certificate(&donor(), &[first.id.clone()])
            .unwrap();
        let result =
            service.generate_tax_certificate(&donor(), &[second.id.clone(), first.id.clone()]);

        assert!(matches!(
            result,
            Err(LifecycleError::Ineligible(Ineligibility::AlreadyCertified { .. }))
        ));
        assert_eq!(service.get_tax_certificates_by_donor(&donor().id).len(), 1);
        assert_eq!(
            service.get_donation(&second.id).unwrap().tax_certificate_id,
            None
        );
    }

    #[test]
    fn test_role_checks() {
        let service = quiet_service();

        let result = service.publish_food_item(&receiver(), apples(1));
        assert!(matches!(result, Err(LifecycleError::Unauthorized { .. })));

        let item = service.publish_food_item(&donor(), apples(1)).unwrap();
        let result = service.reserve_food_item(&volunteer(), &item.id);
        assert!(matches!(result, Err(LifecycleError::Unauthorized { .. })));
        assert_eq!(
            service.get_food_item(&item.id).unwrap().status,
            FoodItemStatus::Available
        );

        let donation = service.reserve_food_item(&receiver(), &item.id).unwrap();
        let result = service.assign_volunteer(&donor(), &donation.id);
        assert!(matches!(result, Err(LifecycleError::Unauthorized { .. })));

        let result = service.generate_tax_certificate(&receiver(), &[donation.id]);
        assert!(matches!(result, Err(LifecycleError::Unauthorized { .. })));
    }

    #[test]
    fn test_role_check_precedes_transition_check() {
        let service = quiet_service();
        let donation = reserved_donation(&service);
        service.assign_volunteer(&volunteer(), &donation.id).unwrap();

        let result =
            service.update_donation_status(&donor(), &donation.id, DonationStatus::Delivered);

        assert!(matches!(result, Err(LifecycleError::Unauthorized { .. })));
        assert_eq!(
            service.get_donation(&donation.id).unwrap().status,
            DonationStatus::Confirmed
        );
    }

    #[test]
    fn test_lot_hold_blocks_reservation_and_listing() {
        let service = quiet_service();
        let item = service.publish_food_item(&donor(), apples(4)).unwrap();
        let lot_id = LotId::new("lot-1");

        service.hold_for_lot(&lot_id, &[item.id.clone()]).unwrap();

        assert_eq!(service.get_lot_hold(&item.id), Some(lot_id));
        assert!(service.get_available_food_items().is_empty());
        let result = service.reserve_food_item(&receiver(), &item.id);
        assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
        assert!(service.get_donation_for_item(&item.id).is_none());
        assert_eq!(
            service.get_food_item(&item.id).unwrap().status,
            FoodItemStatus::Available
        );
    }

    #[test]
    fn test_unassigned_volunteer_cannot_advance() {
        let service = quiet_service();
        let donation = reserved_donation(&service);

        let result =
            service.update_donation_status(&volunteer(), &donation.id, DonationStatus::InTransit);

        assert!(matches!(result, Err(LifecycleError::Unauthorized { .. })));
    }

    #[test]
    fn test_expiry_sweep_hides_and_blocks_items() {
        let h = harness();
        let mut events = h.bus.subscribe(EventFilter::all());
        let item = h.service.publish_food_item(&donor(), apples(4)).unwrap();

        h.time.advance(3 * DAY_MS);
        assert!(h.service.get_available_food_items().is_empty());

        let expired = h.service.expire_food_items();
        assert_eq!(expired, vec![item.id.clone()]);
        assert_eq!(
            h.service.get_food_item(&item.id).unwrap().status,
            FoodItemStatus::Expired
        );
        assert!(matches!(
            h.service.reserve_food_item(&receiver(), &item.id),
            Err(LifecycleError::InvalidState { .. })
        ));
        assert!(h.service.expire_food_items().is_empty());

        let last = events.drain().pop();
        assert!(matches!(last, Some(DonationEvent::FoodItemsExpired { .. })));
    }

    #[test]
    fn test_rejected_operations_publish_nothing() {
        let h = harness();
        let mut events = h.bus.subscribe(EventFilter::all());

        let _ = h.service.publish_food_item(&donor(), apples(0));
        let _ = h
            .service
            .reserve_food_item(&receiver(), &FoodItemId::new("missing"));

        assert!(events.drain().is_empty());
        assert_eq!(h.bus.events_published(), 0);
    }

    #[test]
    fn test_ids_not_consumed_by_failures() {
        let service = quiet_service();
        let _ = service.publish_food_item(&donor(), apples(0));
        let item = service.publish_food_item(&donor(), apples(1)).unwrap();
        assert_eq!(item.id, FoodItemId::new("food-1"));
    }

    fn any_status() -> impl Strategy<Value = DonationStatus> {
        prop_oneof![
            Just(DonationStatus::Pending),
            Just(DonationStatus::Confirmed),
            Just(DonationStatus::InTransit),
            Just(DonationStatus::Delivered),
        ]
    }

    proptest! {
        #[test]
        fn prop_status_only_moves_forward(requests in prop::collection::vec(any_status(), 0..12)) {
            let service = quiet_service();
            let donation = reserved_donation(&service);
            service.assign_volunteer(&volunteer(), &donation.id).unwrap();

            let mut observed = vec![DonationStatus::Confirmed];
            for requested in requests {
                let before = *observed.last().unwrap();
                match service.update_donation_status(&volunteer(), &donation.id, requested) {
                    Ok(updated) => {
                        prop_assert!(before.can_transition_to(updated.status));
                        observed.push(updated.status);
                    }
                    Err(err) => {
                        let is_invalid_transition =
                            matches!(err, LifecycleError::InvalidTransition { .. });
                        prop_assert!(is_invalid_transition);
                        prop_assert_eq!(service.get_donation(&donation.id).unwrap().status, before);
                    }
                }
            }

            let path = [
                DonationStatus::Confirmed,
                DonationStatus::InTransit,
                DonationStatus::Delivered,
            ];
            prop_assert!(path.starts_with(&observed));
            let item_delivered = service.get_food_item(&donation.food_item_id).unwrap().status
                == FoodItemStatus::Delivered;
            prop_assert_eq!(item_delivered, observed.last() == Some(&DonationStatus::Delivered));
        }
    }
}
