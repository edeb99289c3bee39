//! # Lifecycle Store - Records and Indices
//!
//! Holds every food item, donation and tax certificate, with the
//! check-and-mutate operations of the lifecycle.
//!
//! ## Data Structures
//!
//! - `items` / `donations` / `certificates`: O(1) lookup by id
//! - `*_order`: insertion order, so every listing is stable
//! - `items_by_donor`, `donations_by_receiver`, `donations_by_volunteer`,
//!   `certificates_by_donor`: per-actor indices
//! - `donation_by_item`: the single donation referencing a reserved item
//! - `lot_holds`: available items claimed by a reserved consolidated lot
//!
//! Each mutating method either applies all of its writes or returns an
//! error having written nothing. Identifier factories are only invoked once
//! every check has passed.

use super::entities::{
    Donation, DonationStatus, FoodItem, FoodItemStatus, NewFoodItem, TaxCertificate,
};
use super::errors::{Ineligibility, LifecycleError};
use super::services::validate_new_food_item;
use super::value_objects::LifecycleStatus;
use crate::config::LifecycleConfig;
use shared_types::{CertificateId, DonationId, FoodItemId, LotId, Role, Timestamp, UserId};
use std::collections::{HashMap, HashSet};

/// In-memory lifecycle state with secondary indices.
#[derive(Debug, Default)]
pub struct LifecycleStore {
    config: LifecycleConfig,

    pub(crate) items: HashMap<FoodItemId, FoodItem>,
    item_order: Vec<FoodItemId>,

    pub(crate) donations: HashMap<DonationId, Donation>,
    donation_order: Vec<DonationId>,

    pub(crate) certificates: HashMap<CertificateId, TaxCertificate>,
    certificate_order: Vec<CertificateId>,

    items_by_donor: HashMap<UserId, Vec<FoodItemId>>,
    donations_by_receiver: HashMap<UserId, Vec<DonationId>>,
    donations_by_volunteer: HashMap<UserId, Vec<DonationId>>,
    certificates_by_donor: HashMap<UserId, Vec<CertificateId>>,
    pub(crate) donation_by_item: HashMap<FoodItemId, DonationId>,
    pub(crate) lot_holds: HashMap<FoodItemId, LotId>,
}

impl LifecycleStore {
    /// Creates an empty store.
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn donation_count(&self) -> usize {
        self.donations.len()
    }

    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Validates `attrs` and stores a new `available` food item.
    ///
    /// # Errors
    /// - `Validation` for malformed attributes
    /// - `DuplicateId` if the generated id is already taken
    pub fn publish(
        &mut self,
        donor_id: UserId,
        attrs: NewFoodItem,
        now: Timestamp,
        new_id: impl FnOnce() -> FoodItemId,
    ) -> Result<FoodItem, LifecycleError> {
        let attrs = validate_new_food_item(attrs, &self.config, now)?;

        let id = new_id();
        if self.items.contains_key(&id) {
            return Err(LifecycleError::DuplicateId(id.to_string()));
        }

        let item = FoodItem {
            id: id.clone(),
            donor_id: donor_id.clone(),
            name: attrs.name,
            quantity: attrs.quantity,
            unit: attrs.unit,
            expiration_date: attrs.expiration_date,
            donor_address: attrs.donor_address,
            status: FoodItemStatus::Available,
            created_at: now,
        };

        self.items.insert(id.clone(), item.clone());
        self.item_order.push(id.clone());
        self.items_by_donor.entry(donor_id).or_default().push(id);

        Ok(item)
    }

    /// Reserves an available item for `receiver_id`, creating a confirmed
    /// donation.
    ///
    /// # Errors
    /// - `FoodItemNotFound` for an unknown item
    /// - `InvalidState` if the item is not available, is held by a reserved
    ///   lot or has passed its expiration date
    pub fn reserve(
        &mut self,
        item_id: &FoodItemId,
        receiver_id: UserId,
        now: Timestamp,
        new_id: impl FnOnce() -> DonationId,
    ) -> Result<Donation, LifecycleError> {
        let item = self
            .items
            .get(item_id)
            .ok_or_else(|| LifecycleError::FoodItemNotFound(item_id.clone()))?;

        if !item.is_available() {
            return Err(LifecycleError::InvalidState {
                entity: "food item",
                id: item_id.to_string(),
                reason: format!("status is {}, expected available", item.status),
            });
        }
        if let Some(lot_id) = self.lot_holds.get(item_id) {
            return Err(LifecycleError::InvalidState {
                entity: "food item",
                id: item_id.to_string(),
                reason: format!("held by reserved lot {lot_id}"),
            });
        }
        if item.is_past_expiration(now) {
            return Err(LifecycleError::InvalidState {
                entity: "food item",
                id: item_id.to_string(),
                reason: format!("expired at {}", item.expiration_date),
            });
        }

        let id = new_id();
        if self.donations.contains_key(&id) {
            return Err(LifecycleError::DuplicateId(id.to_string()));
        }

        let donation = Donation::confirmed(id.clone(), item, receiver_id.clone(), now);

        if let Some(item) = self.items.get_mut(item_id) {
            item.status = FoodItemStatus::Reserved;
        }
        self.donations.insert(id.clone(), donation.clone());
        self.donation_order.push(id.clone());
        self.donation_by_item.insert(item_id.clone(), id.clone());
        self.donations_by_receiver
            .entry(receiver_id)
            .or_default()
            .push(id);

        Ok(donation)
    }

    /// Claims every item of a consolidated lot for that lot, all or nothing.
    ///
    /// Held items keep their `available` status but can no longer be
    /// reserved individually, are not listed as available and are skipped
    /// by the expiry sweep.
    ///
    /// # Errors
    /// - `FoodItemNotFound` for an unknown item
    /// - `InvalidState` if any item is not available, is already held or
    ///   has passed its expiration date
    pub fn hold_for_lot(
        &mut self,
        lot_id: &LotId,
        item_ids: &[FoodItemId],
        now: Timestamp,
    ) -> Result<(), LifecycleError> {
        for item_id in item_ids {
            let item = self
                .items
                .get(item_id)
                .ok_or_else(|| LifecycleError::FoodItemNotFound(item_id.clone()))?;

            let reason = if !item.is_available() {
                Some(format!("status is {}, expected available", item.status))
            } else if let Some(holder) = self.lot_holds.get(item_id) {
                Some(format!("already held by lot {holder}"))
            } else if item.is_past_expiration(now) {
                Some(format!("expired at {}", item.expiration_date))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(LifecycleError::InvalidState {
                    entity: "food item",
                    id: item_id.to_string(),
                    reason,
                });
            }
        }

        for item_id in item_ids {
            self.lot_holds.insert(item_id.clone(), lot_id.clone());
        }
        Ok(())
    }

    /// Sets the volunteer of a confirmed, unassigned donation.
    ///
    /// # Errors
    /// - `DonationNotFound` for an unknown donation
    /// - `InvalidState` if the donation is not confirmed or already has a
    ///   volunteer
    pub fn assign_volunteer(
        &mut self,
        donation_id: &DonationId,
        volunteer_id: UserId,
    ) -> Result<Donation, LifecycleError> {
        let donation = self
            .donations
            .get_mut(donation_id)
            .ok_or_else(|| LifecycleError::DonationNotFound(donation_id.clone()))?;

        if donation.status != DonationStatus::Confirmed {
            return Err(LifecycleError::InvalidState {
                entity: "donation",
                id: donation_id.to_string(),
                reason: format!("status is {}, expected confirmed", donation.status),
            });
        }
        if let Some(current) = &donation.volunteer_id {
            return Err(LifecycleError::InvalidState {
                entity: "donation",
                id: donation_id.to_string(),
                reason: format!("already assigned to volunteer {current}"),
            });
        }

        donation.volunteer_id = Some(volunteer_id.clone());
        let snapshot = donation.clone();
        self.donations_by_volunteer
            .entry(volunteer_id)
            .or_default()
            .push(donation_id.clone());

        Ok(snapshot)
    }

    /// Moves a donation one step along `confirmed → in_transit → delivered`.
    ///
    /// Returns the updated donation and the status it left. Reaching
    /// `delivered` also marks the food item delivered.
    ///
    /// # Errors
    /// - `DonationNotFound` for an unknown donation
    /// - `InvalidTransition` for any other requested edge
    /// - `Unauthorized` if `actor_id` is not the assigned volunteer
    pub fn advance(
        &mut self,
        donation_id: &DonationId,
        actor_id: &UserId,
        to: DonationStatus,
    ) -> Result<(Donation, DonationStatus), LifecycleError> {
        let donation = self
            .donations
            .get(donation_id)
            .ok_or_else(|| LifecycleError::DonationNotFound(donation_id.clone()))?;

        let from = donation.status;
        if !from.can_transition_to(to) {
            return Err(LifecycleError::InvalidTransition {
                donation_id: donation_id.clone(),
                from,
                to,
            });
        }
        if !donation.is_assigned_to(actor_id) {
            return Err(LifecycleError::Unauthorized {
                actor: actor_id.clone(),
                role: Role::Volunteer,
                operation: "update a donation it is not assigned to",
            });
        }

        let item_id = donation.food_item_id.clone();
        if !self.items.contains_key(&item_id) {
            return Err(LifecycleError::FoodItemNotFound(item_id));
        }

        if to == DonationStatus::Delivered {
            if let Some(item) = self.items.get_mut(&item_id) {
                item.status = FoodItemStatus::Delivered;
            }
        }

        let donation = self
            .donations
            .get_mut(donation_id)
            .ok_or_else(|| LifecycleError::DonationNotFound(donation_id.clone()))?;
        donation.status = to;

        Ok((donation.clone(), from))
    }

    /// Issues one certificate covering `donation_ids`, all or nothing.
    ///
    /// # Errors
    /// - `Ineligible` if the list is empty, too long or has duplicates, or
    ///   any donation is unknown, belongs to another donor, is not
    ///   delivered or is already certified
    pub fn issue_certificate(
        &mut self,
        donor_id: &UserId,
        donation_ids: &[DonationId],
        now: Timestamp,
        new_id: impl FnOnce() -> CertificateId,
    ) -> Result<TaxCertificate, LifecycleError> {
        if donation_ids.is_empty() {
            return Err(Ineligibility::Empty.into());
        }
        let max = self.config.max_certificate_batch;
        if donation_ids.len() > max {
            return Err(Ineligibility::BatchTooLarge {
                size: donation_ids.len(),
                max,
            }
            .into());
        }

        let mut seen = HashSet::with_capacity(donation_ids.len());
        let mut total_items: u64 = 0;
        for donation_id in donation_ids {
            if !seen.insert(donation_id) {
                return Err(Ineligibility::Duplicate(donation_id.clone()).into());
            }
            let donation = self.check_certifiable(donor_id, donation_id)?;
            total_items += self
                .items
                .get(&donation.food_item_id)
                .map_or(0, |item| u64::from(item.quantity));
        }

        let id = new_id();
        if self.certificates.contains_key(&id) {
            return Err(LifecycleError::DuplicateId(id.to_string()));
        }

        for donation_id in donation_ids {
            if let Some(donation) = self.donations.get_mut(donation_id) {
                donation.tax_certificate_id = Some(id.clone());
            }
        }

        let certificate = TaxCertificate {
            id: id.clone(),
            donor_id: donor_id.clone(),
            donation_ids: donation_ids.to_vec(),
            total_items,
            issued_at: now,
        };
        self.certificates.insert(id.clone(), certificate.clone());
        self.certificate_order.push(id.clone());
        self.certificates_by_donor
            .entry(donor_id.clone())
            .or_default()
            .push(id);

        Ok(certificate)
    }

    fn check_certifiable(
        &self,
        donor_id: &UserId,
        donation_id: &DonationId,
    ) -> Result<&Donation, Ineligibility> {
        let donation = self
            .donations
            .get(donation_id)
            .ok_or_else(|| Ineligibility::UnknownDonation(donation_id.clone()))?;

        if &donation.donor_id != donor_id {
            return Err(Ineligibility::NotOwner {
                donation_id: donation_id.clone(),
                owner: donation.donor_id.clone(),
            });
        }
        if donation.status != DonationStatus::Delivered {
            return Err(Ineligibility::NotDelivered {
                donation_id: donation_id.clone(),
                status: donation.status,
            });
        }
        if let Some(certificate_id) = &donation.tax_certificate_id {
            return Err(Ineligibility::AlreadyCertified {
                donation_id: donation_id.clone(),
                certificate_id: certificate_id.clone(),
            });
        }
        Ok(donation)
    }

    /// Marks every available item past its expiration date as expired.
    /// Items held by a lot are left alone.
    ///
    /// Returns the expired ids in publication order.
    pub fn expire_due(&mut self, now: Timestamp) -> Vec<FoodItemId> {
        let mut expired = Vec::new();
        for id in &self.item_order {
            let Some(item) = self.items.get_mut(id) else {
                continue;
            };
            if item.is_available()
                && item.is_past_expiration(now)
                && !self.lot_holds.contains_key(id)
            {
                item.status = FoodItemStatus::Expired;
                expired.push(id.clone());
            }
        }
        expired
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn food_item(&self, id: &FoodItemId) -> Option<&FoodItem> {
        self.items.get(id)
    }

    pub fn donation(&self, id: &DonationId) -> Option<&Donation> {
        self.donations.get(id)
    }

    pub fn certificate(&self, id: &CertificateId) -> Option<&TaxCertificate> {
        self.certificates.get(id)
    }

    /// The donation created when `item_id` was reserved.
    pub fn donation_for_item(&self, item_id: &FoodItemId) -> Option<&Donation> {
        self.donation_by_item
            .get(item_id)
            .and_then(|id| self.donations.get(id))
    }

    /// Reservable items: available, not held by a lot and not yet past
    /// expiration.
    pub fn available_items(&self, now: Timestamp) -> impl Iterator<Item = &FoodItem> + '_ {
        self.items_in(&self.item_order).filter(move |item| {
            item.is_available()
                && !self.lot_holds.contains_key(&item.id)
                && !item.is_past_expiration(now)
        })
    }

    /// The reserved lot holding `item_id`, if any.
    pub fn lot_hold(&self, item_id: &FoodItemId) -> Option<&LotId> {
        self.lot_holds.get(item_id)
    }

    pub fn items_by_donor(&self, donor_id: &UserId) -> impl Iterator<Item = &FoodItem> + '_ {
        self.items_in(index_slice(&self.items_by_donor, donor_id))
    }

    /// Items reserved by `receiver_id`, in reservation order.
    pub fn items_by_receiver(&self, receiver_id: &UserId) -> impl Iterator<Item = &FoodItem> + '_ {
        self.donations_in(index_slice(&self.donations_by_receiver, receiver_id))
            .filter_map(move |donation| self.items.get(&donation.food_item_id))
    }

    pub fn donations_by_volunteer(
        &self,
        volunteer_id: &UserId,
    ) -> impl Iterator<Item = &Donation> + '_ {
        self.donations_in(index_slice(&self.donations_by_volunteer, volunteer_id))
    }

    /// Confirmed donations nobody has picked up yet.
    pub fn available_deliveries(&self) -> impl Iterator<Item = &Donation> + '_ {
        self.donations_in(&self.donation_order)
            .filter(|donation| donation.is_open_for_pickup())
    }

    pub fn uncertified_donations<'a>(
        &'a self,
        donor_id: &'a UserId,
    ) -> impl Iterator<Item = &'a Donation> + 'a {
        self.donations_in(&self.donation_order)
            .filter(move |donation| &donation.donor_id == donor_id && donation.is_certifiable())
    }

    pub fn certificates_by_donor(
        &self,
        donor_id: &UserId,
    ) -> impl Iterator<Item = &TaxCertificate> + '_ {
        index_slice(&self.certificates_by_donor, donor_id)
            .iter()
            .filter_map(move |id| self.certificates.get(id))
    }

    /// Counts of records per state.
    pub fn status(&self) -> LifecycleStatus {
        let mut status = LifecycleStatus {
            certificates: self.certificates.len(),
            ..LifecycleStatus::default()
        };

        for item in self.items.values() {
            match item.status {
                FoodItemStatus::Available => status.available_items += 1,
                FoodItemStatus::Reserved => status.reserved_items += 1,
                FoodItemStatus::Delivered => status.delivered_items += 1,
                FoodItemStatus::Expired => status.expired_items += 1,
            }
        }

        for donation in self.donations.values() {
            match donation.status {
                DonationStatus::Pending => {}
                DonationStatus::Confirmed => {
                    status.confirmed_donations += 1;
                    if donation.volunteer_id.is_none() {
                        status.awaiting_volunteer += 1;
                    }
                }
                DonationStatus::InTransit => status.in_transit_donations += 1,
                DonationStatus::Delivered => {
                    status.delivered_donations += 1;
                    if donation.tax_certificate_id.is_none() {
                        status.uncertified_donations += 1;
                    }
                }
            }
        }

        status
    }

    fn items_in<'a>(&'a self, ids: &'a [FoodItemId]) -> impl Iterator<Item = &'a FoodItem> + 'a {
        ids.iter().filter_map(move |id| self.items.get(id))
    }

    fn donations_in<'a>(
        &'a self,
        ids: &'a [DonationId],
    ) -> impl Iterator<Item = &'a Donation> + 'a {
        ids.iter().filter_map(move |id| self.donations.get(id))
    }
}

fn index_slice<'a, V>(index: &'a HashMap<UserId, Vec<V>>, key: &UserId) -> &'a [V] {
    index.get(key).map_or(&[], Vec::as_slice)
}
