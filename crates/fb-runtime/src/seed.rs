//! # Demo Data
//!
//! Populates a fresh container with donors' items, logistics providers, one
//! consolidated lot and its quotes, all through the public subsystem APIs.

use fb_01_donation_lifecycle::{LifecycleApi, LifecycleError, NewFoodItem};
use fb_02_consolidated_logistics::{
    LogisticsApi, LogisticsError, LogisticsProvider, LogisticsQuote,
};
use shared_types::{FoodItemId, Identity, LotId, ProviderId, QuoteId, Timestamp};
use thiserror::Error;
use tracing::info;

use crate::container::SubsystemContainer;

const DAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Demo seeding errors.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to seed lifecycle data: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Failed to seed logistics data: {0}")]
    Logistics(#[from] LogisticsError),
}

/// What the seeding created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub food_item_ids: Vec<FoodItemId>,
    pub lot_id: LotId,
    pub provider_ids: Vec<ProviderId>,
}

pub fn demo_donor() -> Identity {
    Identity::donor("donor-ana")
}

pub fn demo_market() -> Identity {
    Identity::donor("donor-market")
}

struct DemoItem {
    donor: fn() -> Identity,
    name: &'static str,
    quantity: u32,
    unit: &'static str,
    shelf_days: u64,
    address: &'static str,
}

const DEMO_ITEMS: [DemoItem; 5] = [
    DemoItem {
        donor: demo_donor,
        name: "Rice",
        quantity: 10,
        unit: "kg",
        shelf_days: 90,
        address: "12 Harbor Street",
    },
    DemoItem {
        donor: demo_donor,
        name: "Canned beans",
        quantity: 24,
        unit: "cans",
        shelf_days: 365,
        address: "12 Harbor Street",
    },
    DemoItem {
        donor: demo_market,
        name: "Bread",
        quantity: 30,
        unit: "loaves",
        shelf_days: 2,
        address: "North Market, stall 4",
    },
    DemoItem {
        donor: demo_market,
        name: "Apples",
        quantity: 15,
        unit: "kg",
        shelf_days: 14,
        address: "North Market, stall 4",
    },
    DemoItem {
        donor: demo_market,
        name: "Milk",
        quantity: 12,
        unit: "l",
        shelf_days: 7,
        address: "North Market, stall 4",
    },
];

/// Seeds the demo data set.
///
/// The last three items are grouped into the `north` lot; the first two stay
/// available for individual reservation.
///
/// # Errors
///
/// Fails on the first rejected operation. Earlier records stay in place.
pub fn seed_demo_data(
    container: &SubsystemContainer,
    now: Timestamp,
) -> Result<SeedSummary, SeedError> {
    let mut food_item_ids = Vec::with_capacity(DEMO_ITEMS.len());
    for demo in &DEMO_ITEMS {
        let item = container.lifecycle.publish_food_item(
            &(demo.donor)(),
            NewFoodItem {
                name: demo.name.to_string(),
                quantity: demo.quantity,
                unit: demo.unit.to_string(),
                expiration_date: now + demo.shelf_days * DAY_MS,
                donor_address: demo.address.to_string(),
            },
        )?;
        food_item_ids.push(item.id);
    }

    let providers = [
        ("prov-citycargo", "CityCargo", "555-0100", 5),
        ("prov-greenvan", "GreenVan Co-op", "555-0175", 4),
    ];
    let mut provider_ids = Vec::with_capacity(providers.len());
    for (id, name, contact, rating) in providers {
        let provider = LogisticsProvider {
            id: ProviderId::new(id),
            name: name.to_string(),
            contact: contact.to_string(),
            rating,
        };
        provider_ids.push(provider.id.clone());
        container.logistics.register_provider(provider)?;
    }

    let lot = container
        .logistics
        .create_lot("north", &food_item_ids[2..])?;

    let quotes = [
        ("q-north-1", "prov-citycargo", 12_000, 3, "refrigerated van"),
        ("q-north-2", "prov-greenvan", 9_500, 5, "cargo bike fleet"),
    ];
    for (id, provider, price_cents, estimated_hours, vehicle) in quotes {
        container.logistics.register_quote(LogisticsQuote {
            id: QuoteId::new(id),
            provider_id: ProviderId::new(provider),
            lot_id: lot.id.clone(),
            price_cents,
            estimated_hours,
            vehicle: vehicle.to_string(),
        })?;
    }

    info!(
        items = food_item_ids.len(),
        providers = provider_ids.len(),
        lot_id = %lot.id,
        "Demo data seeded"
    );

    Ok(SeedSummary {
        food_item_ids,
        lot_id: lot.id,
        provider_ids,
    })
}
