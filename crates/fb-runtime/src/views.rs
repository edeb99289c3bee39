//! # Page Views
//!
//! Serializable snapshots of every page a signed-in user can open.
//!
//! `render_page` dispatches on the closed `Role` enum for the dashboard and
//! reads the subsystems through their inbound APIs for every other page. It
//! never mutates state and enforces no business rule; a page opened by the
//! "wrong" role simply renders that user's (usually empty) slice of data.

use std::fmt;
use std::str::FromStr;

use fb_01_donation_lifecycle::{
    Donation, DonationStatus, LifecycleApi, LifecycleConfig, TaxCertificate,
};
use fb_02_consolidated_logistics::{ConsolidatedLot, CostShare, LogisticsApi, LogisticsQuote};
use serde::{Deserialize, Serialize};
use shared_types::{DonationId, FoodItem, FoodItemStatus, Identity, Role, Timestamp, UserId};
use thiserror::Error;

// =============================================================================
// PAGES
// =============================================================================

/// Every page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Dashboard,
    AddFood,
    ConsolidatedLots,
    Donations,
    AvailableFood,
    MyReservations,
    Routes,
    AvailableDeliveries,
    TaxCertificates,
}

impl Page {
    pub const ALL: [Page; 9] = [
        Page::Dashboard,
        Page::AddFood,
        Page::ConsolidatedLots,
        Page::Donations,
        Page::AvailableFood,
        Page::MyReservations,
        Page::Routes,
        Page::AvailableDeliveries,
        Page::TaxCertificates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::AddFood => "add_food",
            Self::ConsolidatedLots => "consolidated_lots",
            Self::Donations => "donations",
            Self::AvailableFood => "available_food",
            Self::MyReservations => "my_reservations",
            Self::Routes => "routes",
            Self::AvailableDeliveries => "available_deliveries",
            Self::TaxCertificates => "tax_certificates",
        }
    }

    /// Pages listed in the navigation menu for `role`.
    pub fn navigation(role: Role) -> &'static [Page] {
        match role {
            Role::Donor => &[
                Page::Dashboard,
                Page::AddFood,
                Page::Donations,
                Page::TaxCertificates,
            ],
            Role::Receiver => &[
                Page::Dashboard,
                Page::AvailableFood,
                Page::ConsolidatedLots,
                Page::MyReservations,
            ],
            Role::Volunteer => &[Page::Dashboard, Page::AvailableDeliveries, Page::Routes],
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown page: {0}")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    /// Accepts both `add_food` and `add-food`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_");
        Page::ALL
            .into_iter()
            .find(|page| page.as_str() == normalized)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

// =============================================================================
// VIEW MODELS
// =============================================================================

/// Rendered page snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PageView {
    DonorDashboard(DonorDashboard),
    ReceiverDashboard(ReceiverDashboard),
    VolunteerDashboard(VolunteerDashboard),
    AddFood(FoodFormLimits),
    ConsolidatedLots(ConsolidatedLotsView),
    Donations(ItemList),
    AvailableFood(ItemList),
    MyReservations(ItemList),
    Routes(RoutesView),
    AvailableDeliveries(DeliveriesView),
    TaxCertificates(TaxCertificatesView),
}

impl PageView {
    /// The page this view was rendered for.
    pub fn page(&self) -> Page {
        match self {
            Self::DonorDashboard(_) | Self::ReceiverDashboard(_) | Self::VolunteerDashboard(_) => {
                Page::Dashboard
            }
            Self::AddFood(_) => Page::AddFood,
            Self::ConsolidatedLots(_) => Page::ConsolidatedLots,
            Self::Donations(_) => Page::Donations,
            Self::AvailableFood(_) => Page::AvailableFood,
            Self::MyReservations(_) => Page::MyReservations,
            Self::Routes(_) => Page::Routes,
            Self::AvailableDeliveries(_) => Page::AvailableDeliveries,
            Self::TaxCertificates(_) => Page::TaxCertificates,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemCounts {
    pub available: usize,
    pub reserved: usize,
    pub delivered: usize,
    pub expired: usize,
}

impl ItemCounts {
    fn of(items: &[FoodItem]) -> Self {
        items.iter().fold(Self::default(), |mut counts, item| {
            match item.status {
                FoodItemStatus::Available => counts.available += 1,
                FoodItemStatus::Reserved => counts.reserved += 1,
                FoodItemStatus::Delivered => counts.delivered += 1,
                FoodItemStatus::Expired => counts.expired += 1,
            }
            counts
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonorDashboard {
    pub donor_id: UserId,
    pub items: Vec<FoodItem>,
    pub counts: ItemCounts,
    /// Delivered donations still waiting for a certificate.
    pub uncertified_donations: usize,
    pub certificates: Vec<TaxCertificate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceiverDashboard {
    pub receiver_id: UserId,
    pub available_items: Vec<FoodItem>,
    pub reservations: Vec<FoodItem>,
    pub available_lots: Vec<ConsolidatedLot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolunteerDashboard {
    pub volunteer_id: UserId,
    pub available_deliveries: Vec<DeliveryEntry>,
    pub routes: Vec<RouteEntry>,
    /// Routes not yet delivered.
    pub active_routes: usize,
}

/// Input limits shown next to the publish form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodFormLimits {
    pub max_name_len: usize,
    pub max_unit_len: usize,
    pub max_address_len: usize,
    pub min_shelf_life_ms: Timestamp,
}

impl From<&LifecycleConfig> for FoodFormLimits {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            max_name_len: config.max_name_len,
            max_unit_len: config.max_unit_len,
            max_address_len: config.max_address_len,
            min_shelf_life_ms: config.min_shelf_life_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemList {
    pub items: Vec<FoodItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotEntry {
    pub lot: ConsolidatedLot,
    pub quotes: Vec<LogisticsQuote>,
    pub cheapest: Option<LogisticsQuote>,
    pub cost_share: Option<CostShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidatedLotsView {
    pub available: Vec<LotEntry>,
    /// Shared lots the viewer could still join.
    pub open_shared: Vec<LotEntry>,
    /// Lots the viewer reserved or joined.
    pub mine: Vec<LotEntry>,
}

/// A confirmed donation waiting for a volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryEntry {
    pub donation_id: DonationId,
    pub item_name: String,
    pub quantity: u32,
    pub unit: String,
    pub pickup_address: String,
    pub receiver_id: Option<UserId>,
}

/// Next step a volunteer can take on a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAction {
    StartDelivery,
    MarkDelivered,
}

impl RouteAction {
    /// Action offered for a donation in `status`, if any.
    pub fn for_status(status: DonationStatus) -> Option<Self> {
        match status {
            DonationStatus::Confirmed => Some(Self::StartDelivery),
            DonationStatus::InTransit => Some(Self::MarkDelivered),
            DonationStatus::Pending | DonationStatus::Delivered => None,
        }
    }

    /// Status requested from the lifecycle when the action is taken.
    pub fn target_status(self) -> DonationStatus {
        match self {
            Self::StartDelivery => DonationStatus::InTransit,
            Self::MarkDelivered => DonationStatus::Delivered,
        }
    }
}

/// One of a volunteer's deliveries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub donation_id: DonationId,
    pub item_name: String,
    pub quantity: u32,
    pub unit: String,
    pub pickup_address: String,
    pub status: DonationStatus,
    pub status_label: &'static str,
    pub next_action: Option<RouteAction>,
}

pub fn status_label(status: DonationStatus) -> &'static str {
    match status {
        DonationStatus::Pending => "Pending",
        DonationStatus::Confirmed => "Confirmed",
        DonationStatus::InTransit => "In transit",
        DonationStatus::Delivered => "Delivered",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutesView {
    pub routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveriesView {
    pub deliveries: Vec<DeliveryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxCertificatesView {
    pub certificates: Vec<TaxCertificate>,
    /// Donations the donor can still certify.
    pub uncertified: Vec<Donation>,
}

// =============================================================================
// RENDERING
// =============================================================================

/// Read-only renderer over both subsystem APIs.
pub struct Views<'a> {
    lifecycle: &'a dyn LifecycleApi,
    logistics: &'a dyn LogisticsApi,
    limits: FoodFormLimits,
}

impl<'a> Views<'a> {
    pub fn new(
        lifecycle: &'a dyn LifecycleApi,
        logistics: &'a dyn LogisticsApi,
        limits: FoodFormLimits,
    ) -> Self {
        Self {
            lifecycle,
            logistics,
            limits,
        }
    }

    /// Renders `page` for `identity`.
    pub fn render_page(&self, identity: &Identity, page: Page) -> PageView {
        let user = &identity.id;
        match page {
            Page::Dashboard => self.dashboard(identity),
            Page::AddFood => PageView::AddFood(self.limits.clone()),
            Page::ConsolidatedLots => PageView::ConsolidatedLots(self.consolidated_lots(user)),
            Page::Donations => PageView::Donations(ItemList {
                items: self.lifecycle.get_food_items_by_donor(user),
            }),
            Page::AvailableFood => PageView::AvailableFood(ItemList {
                items: self.lifecycle.get_available_food_items(),
            }),
            Page::MyReservations => PageView::MyReservations(ItemList {
                items: self.lifecycle.get_food_items_by_receiver(user),
            }),
            Page::Routes => PageView::Routes(RoutesView {
                routes: self.routes(user),
            }),
            Page::AvailableDeliveries => PageView::AvailableDeliveries(DeliveriesView {
                deliveries: self.available_deliveries(),
            }),
            Page::TaxCertificates => PageView::TaxCertificates(TaxCertificatesView {
                certificates: self.lifecycle.get_tax_certificates_by_donor(user),
                uncertified: self.lifecycle.get_uncertified_donations(user),
            }),
        }
    }

    fn dashboard(&self, identity: &Identity) -> PageView {
        let user = &identity.id;
        match identity.role {
            Role::Donor => {
                let items = self.lifecycle.get_food_items_by_donor(user);
                PageView::DonorDashboard(DonorDashboard {
                    donor_id: user.clone(),
                    counts: ItemCounts::of(&items),
                    items,
                    uncertified_donations: self.lifecycle.get_uncertified_donations(user).len(),
                    certificates: self.lifecycle.get_tax_certificates_by_donor(user),
                })
            }
            Role::Receiver => PageView::ReceiverDashboard(ReceiverDashboard {
                receiver_id: user.clone(),
                available_items: self.lifecycle.get_available_food_items(),
                reservations: self.lifecycle.get_food_items_by_receiver(user),
                available_lots: self.logistics.get_available_lots(),
            }),
            Role::Volunteer => {
                let routes = self.routes(user);
                PageView::VolunteerDashboard(VolunteerDashboard {
                    volunteer_id: user.clone(),
                    available_deliveries: self.available_deliveries(),
                    active_routes: routes
                        .iter()
                        .filter(|route| !route.status.is_terminal())
                        .count(),
                    routes,
                })
            }
        }
    }

    fn consolidated_lots(&self, user: &UserId) -> ConsolidatedLotsView {
        let entries = |lots: Vec<ConsolidatedLot>| -> Vec<LotEntry> {
            lots.into_iter().map(|lot| self.lot_entry(lot)).collect()
        };
        let open_shared = self
            .logistics
            .get_open_shared_lots()
            .into_iter()
            .filter(|lot| !lot.participants().contains(user))
            .collect();

        ConsolidatedLotsView {
            available: entries(self.logistics.get_available_lots()),
            open_shared: entries(open_shared),
            mine: entries(self.logistics.get_lots_for_receiver(user)),
        }
    }

    fn lot_entry(&self, lot: ConsolidatedLot) -> LotEntry {
        LotEntry {
            quotes: self.logistics.get_logistics_quotes(&lot.id),
            cheapest: self.logistics.cheapest_quote(&lot.id),
            cost_share: self.logistics.cost_share(&lot.id).ok(),
            lot,
        }
    }

    fn available_deliveries(&self) -> Vec<DeliveryEntry> {
        self.lifecycle
            .get_available_deliveries()
            .into_iter()
            .filter_map(|donation| {
                let item = self.lifecycle.get_food_item(&donation.food_item_id)?;
                Some(DeliveryEntry {
                    donation_id: donation.id,
                    item_name: item.name,
                    quantity: item.quantity,
                    unit: item.unit,
                    pickup_address: item.donor_address,
                    receiver_id: donation.receiver_id,
                })
            })
            .collect()
    }

    fn routes(&self, volunteer_id: &UserId) -> Vec<RouteEntry> {
        self.lifecycle
            .get_donations_by_volunteer(volunteer_id)
            .into_iter()
            .filter_map(|donation| {
                let item = self.lifecycle.get_food_item(&donation.food_item_id)?;
                Some(RouteEntry {
                    donation_id: donation.id,
                    item_name: item.name,
                    quantity: item.quantity,
                    unit: item.unit,
                    pickup_address: item.donor_address,
                    status: donation.status,
                    status_label: status_label(donation.status),
                    next_action: RouteAction::for_status(donation.status),
                })
            })
            .collect()
    }
}
