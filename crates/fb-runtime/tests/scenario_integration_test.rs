//! # Scenario Integration Tests
//!
//! Drive both subsystems through the container and observe the results
//! through the page views, the way the presentation layer does.

use std::sync::Arc;
use std::thread;

use fb_01_donation_lifecycle::{
    DonationStatus, LifecycleApi, LifecycleError, ManualTimeSource, NewFoodItem,
    SequentialIdGenerator,
};
use fb_02_consolidated_logistics::{LogisticsApi, LogisticsError, LogisticsOption};
use fb_runtime::seed::{demo_donor, seed_demo_data};
use fb_runtime::views::{FoodFormLimits, RouteAction};
use fb_runtime::{FoodBridgeRuntime, Page, PageView, RuntimeConfig, SubsystemContainer, Views};
use shared_bus::{DonationEvent, EventFilter, EventTopic};
use shared_types::{FoodItemStatus, Identity, QuoteId};

const NOW: u64 = 1_700_000_000_000;
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

struct Harness {
    container: SubsystemContainer,
    time: Arc<ManualTimeSource>,
}

impl Harness {
    fn new() -> Self {
        let time = Arc::new(ManualTimeSource::new(NOW));
        let config = RuntimeConfig {
            seed_demo_data: false,
            ..RuntimeConfig::default()
        };
        let container = SubsystemContainer::with_ports(
            config,
            time.clone(),
            Arc::new(SequentialIdGenerator::new()),
        );
        Self { container, time }
    }

    fn views(&self) -> Views<'_> {
        Views::new(
            self.container.lifecycle.as_ref(),
            self.container.logistics.as_ref(),
            FoodFormLimits::from(&self.container.config.lifecycle),
        )
    }

    fn publish(&self, donor: &Identity, name: &str, quantity: u32) -> shared_types::FoodItem {
        self.container
            .lifecycle
            .publish_food_item(
                donor,
                NewFoodItem {
                    name: name.to_string(),
                    quantity,
                    unit: "kg".to_string(),
                    expiration_date: NOW + 3 * DAY_MS,
                    donor_address: "12 Harbor Street".to_string(),
                },
            )
            .unwrap()
    }
}

#[test]
fn test_full_donation_scenario_through_views() {
    let h = Harness::new();
    let donor = Identity::donor("d-1");
    let receiver = Identity::receiver("r-1");
    let volunteer = Identity::volunteer("v-1");
    let mut events = h.container.subscribe(EventFilter::all());

    let item = h.publish(&donor, "Rice", 10);
    let PageView::AvailableFood(available) = h.views().render_page(&receiver, Page::AvailableFood)
    else {
        panic!("expected available food view");
    };
    assert_eq!(available.items, vec![item.clone()]);

    let donation = h
        .container
        .lifecycle
        .reserve_food_item(&receiver, &item.id)
        .unwrap();
    assert_eq!(donation.status, DonationStatus::Confirmed);
    assert_eq!(donation.receiver_id, Some(receiver.id.clone()));

    let PageView::MyReservations(reservations) =
        h.views().render_page(&receiver, Page::MyReservations)
    else {
        panic!("expected reservations view");
    };
    assert_eq!(reservations.items[0].status, FoodItemStatus::Reserved);

    let PageView::AvailableDeliveries(deliveries) =
        h.views().render_page(&volunteer, Page::AvailableDeliveries)
    else {
        panic!("expected deliveries view");
    };
    assert_eq!(deliveries.deliveries.len(), 1);
    assert_eq!(deliveries.deliveries[0].pickup_address, "12 Harbor Street");

    h.container
        .lifecycle
        .assign_volunteer(&volunteer, &donation.id)
        .unwrap();

    let mut taken = Vec::new();
    loop {
        let PageView::Routes(routes) = h.views().render_page(&volunteer, Page::Routes) else {
            panic!("expected routes view");
        };
        let route = &routes.routes[0];
        let Some(action) = route.next_action else {
            assert_eq!(route.status_label, "Delivered");
            break;
        };
        taken.push(action);
        h.container
            .lifecycle
            .update_donation_status(&volunteer, &donation.id, action.target_status())
            .unwrap();
    }
    assert_eq!(
        taken,
        vec![RouteAction::StartDelivery, RouteAction::MarkDelivered]
    );
    assert_eq!(
        h.container.lifecycle.get_food_item(&item.id).unwrap().status,
        FoodItemStatus::Delivered
    );

    let certificate = h
        .container
        .lifecycle
        .generate_tax_certificate(&donor, &[donation.id.clone()])
        .unwrap();
    assert_eq!(certificate.total_items, 10);

    let PageView::TaxCertificates(certificates) =
        h.views().render_page(&donor, Page::TaxCertificates)
    else {
        panic!("expected certificates view");
    };
    assert_eq!(certificates.certificates, vec![certificate.clone()]);
    assert!(certificates.uncertified.is_empty());
    assert_eq!(
        h.container
            .lifecycle
            .get_donation(&donation.id)
            .unwrap()
            .tax_certificate_id,
        Some(certificate.id)
    );

    let received = events.drain();
    assert_eq!(received.len(), 6);
    assert!(matches!(
        received.last(),
        Some(DonationEvent::TaxCertificateGenerated { .. })
    ));
}

#[test]
fn test_dashboard_dispatches_on_role() {
    let h = Harness::new();
    h.publish(&Identity::donor("d-1"), "Rice", 10);

    let view = h
        .views()
        .render_page(&Identity::donor("d-1"), Page::Dashboard);
    let PageView::DonorDashboard(dashboard) = &view else {
        panic!("expected donor dashboard, got {view:?}");
    };
    assert_eq!(dashboard.counts.available, 1);

    let view = h
        .views()
        .render_page(&Identity::receiver("r-1"), Page::Dashboard);
    let PageView::ReceiverDashboard(dashboard) = &view else {
        panic!("expected receiver dashboard, got {view:?}");
    };
    assert_eq!(dashboard.available_items.len(), 1);

    let view = h
        .views()
        .render_page(&Identity::volunteer("v-1"), Page::Dashboard);
    assert!(matches!(view, PageView::VolunteerDashboard(_)));
    assert_eq!(view.page(), Page::Dashboard);

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["view"], "volunteer_dashboard");
}

#[test]
fn test_expired_items_leave_listings_and_lots() {
    let h = Harness::new();
    let donor = Identity::donor("d-1");
    let rice = h.publish(&donor, "Rice", 10);
    let beans = h.publish(&donor, "Beans", 4);
    h.container
        .logistics
        .create_lot("north", &[rice.id.clone(), beans.id.clone()])
        .unwrap();

    h.time.advance(3 * DAY_MS);
    assert!(h.container.lifecycle.get_available_food_items().is_empty());
    let result = h
        .container
        .lifecycle
        .reserve_food_item(&Identity::receiver("r-1"), &rice.id);
    assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));

    let expired = h.container.lifecycle.expire_food_items();
    assert_eq!(expired.len(), 2);
    assert!(h.container.logistics.get_available_lots().is_empty());
}

#[test]
fn test_concurrent_reservations_through_container() {
    let h = Harness::new();
    let item = h.publish(&Identity::donor("d-1"), "Rice", 10);
    let lifecycle = h.container.lifecycle.clone();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let lifecycle = lifecycle.clone();
            let item_id = item.id.clone();
            thread::spawn(move || {
                lifecycle.reserve_food_item(&Identity::receiver(format!("r-{i}")), &item_id)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|err| matches!(err, LifecycleError::InvalidState { .. })));
}

#[test]
fn test_lots_read_items_through_lifecycle() {
    let h = Harness::new();
    let donor = Identity::donor("d-1");
    let rice = h.publish(&donor, "Rice", 10);
    let beans = h.publish(&donor, "Beans", 4);
    let mut logistics_events = h
        .container
        .subscribe(EventFilter::topics(vec![EventTopic::Logistics]));

    h.container
        .lifecycle
        .reserve_food_item(&Identity::receiver("r-1"), &beans.id)
        .unwrap();
    let result = h
        .container
        .logistics
        .create_lot("north", &[rice.id.clone(), beans.id.clone()]);
    assert!(matches!(result, Err(LogisticsError::ItemUnavailable { .. })));

    let lot = h
        .container
        .logistics
        .create_lot("north", &[rice.id.clone()])
        .unwrap();
    assert_eq!(lot.total_quantity, 10);
    h.container
        .logistics
        .reserve_lot(
            &Identity::receiver("r-2"),
            &lot.id,
            LogisticsOption::SharedLogistics,
        )
        .unwrap();

    let PageView::ConsolidatedLots(lots) = h
        .views()
        .render_page(&Identity::receiver("r-3"), Page::ConsolidatedLots)
    else {
        panic!("expected lots view");
    };
    assert!(lots.available.is_empty());
    assert_eq!(lots.open_shared.len(), 1);
    assert!(lots.mine.is_empty());

    h.container
        .logistics
        .join_shared_logistics(&Identity::receiver("r-3"), &lot.id)
        .unwrap();
    let second = h
        .container
        .logistics
        .join_shared_logistics(&Identity::receiver("r-3"), &lot.id);
    assert!(matches!(
        second,
        Err(LogisticsError::AlreadyParticipating { .. })
    ));

    assert_eq!(logistics_events.drain().len(), 3);
}

#[test]
fn test_reserved_lot_items_cannot_be_reserved_individually() {
    let h = Harness::new();
    let donor = Identity::donor("d-1");
    let rice = h.publish(&donor, "Rice", 10);
    let beans = h.publish(&donor, "Beans", 4);
    let lot = h
        .container
        .logistics
        .create_lot("north", &[rice.id.clone(), beans.id.clone()])
        .unwrap();

    h.container
        .logistics
        .reserve_lot(
            &Identity::receiver("r-1"),
            &lot.id,
            LogisticsOption::BeneficiaryCovers,
        )
        .unwrap();

    let result = h
        .container
        .lifecycle
        .reserve_food_item(&Identity::receiver("r-2"), &beans.id);
    assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
    assert_eq!(h.container.lifecycle.get_lot_hold(&beans.id), Some(lot.id));
    assert_eq!(
        h.container.lifecycle.get_food_item(&beans.id).unwrap().status,
        FoodItemStatus::Available
    );

    let PageView::AvailableFood(available) = h
        .views()
        .render_page(&Identity::receiver("r-2"), Page::AvailableFood)
    else {
        panic!("expected available food view");
    };
    assert!(available.items.is_empty());
}

#[tokio::test]
async fn test_runtime_demo_scenario() {
    let time = Arc::new(ManualTimeSource::new(NOW));
    let mut runtime = FoodBridgeRuntime::new(
        RuntimeConfig::default(),
        time,
        Arc::new(SequentialIdGenerator::new()),
    );

    let seed = runtime.start().unwrap().unwrap();
    let report = runtime.run_demo_scenario(&seed).unwrap();

    assert_eq!(report.lot_id, seed.lot_id);
    assert_eq!(report.cost_share.quote_id, QuoteId::new("q-north-2"));
    assert_eq!(report.cost_share.participants, 2);
    assert_eq!(report.cost_share.per_participant_cents, 4_750);

    let container = runtime.container();
    assert!(container
        .lifecycle
        .get_uncertified_donations(&demo_donor().id)
        .is_empty());
    assert_eq!(
        container
            .lifecycle
            .get_tax_certificates_by_donor(&demo_donor().id)
            .len(),
        1
    );

    // 5 items and 1 lot seeded, then 7 scenario events.
    assert_eq!(runtime.shutdown().await, 13);
}

#[tokio::test]
async fn test_runtime_without_seed_starts_empty() {
    let config = RuntimeConfig {
        seed_demo_data: false,
        ..RuntimeConfig::default()
    };
    let mut runtime = FoodBridgeRuntime::new(
        config,
        Arc::new(ManualTimeSource::new(NOW)),
        Arc::new(SequentialIdGenerator::new()),
    );

    assert!(runtime.start().unwrap().is_none());
    assert_eq!(runtime.container().lifecycle.get_status().total_items(), 0);
    assert_eq!(runtime.shutdown().await, 0);
}

#[test]
fn test_seeded_container_cost_share_before_reservation() {
    let h = Harness::new();
    let seed = seed_demo_data(&h.container, NOW).unwrap();

    let share = h.container.logistics.cost_share(&seed.lot_id).unwrap();
    assert_eq!(share.participants, 1);
    assert_eq!(share.per_participant_cents, 9_500);
}
