//! Inbound (Driving) ports for the Donation Lifecycle subsystem.
//!
//! Every mutating operation takes the acting `Identity` and checks its role
//! before touching state. Queries return cloned snapshots in insertion
//! order.

use crate::domain::{
    Donation, DonationStatus, LifecycleError, LifecycleStatus, NewFoodItem, TaxCertificate,
};
use shared_types::{DonationId, FoodItem, FoodItemId, Identity, LotId, UserId};

/// Primary API for the Donation Lifecycle subsystem.
pub trait LifecycleApi: Send + Sync {
    /// Publishes a food item as `available`.
    ///
    /// # Errors
    /// - `Unauthorized` unless the actor is a donor
    /// - `Validation` for malformed attributes
    fn publish_food_item(
        &self,
        donor: &Identity,
        attrs: NewFoodItem,
    ) -> Result<FoodItem, LifecycleError>;

    /// Reserves an available item, creating a `confirmed` donation.
    ///
    /// # Errors
    /// - `Unauthorized` unless the actor is a receiver
    /// - `FoodItemNotFound` for an unknown item
    /// - `InvalidState` if the item is no longer available or is held by a
    ///   reserved lot
    fn reserve_food_item(
        &self,
        receiver: &Identity,
        item_id: &FoodItemId,
    ) -> Result<Donation, LifecycleError>;

    /// Takes a confirmed delivery. The first volunteer wins.
    ///
    /// # Errors
    /// - `Unauthorized` unless the actor is a volunteer
    /// - `DonationNotFound` for an unknown donation
    /// - `InvalidState` if the donation is not confirmed or already taken
    fn assign_volunteer(
        &self,
        volunteer: &Identity,
        donation_id: &DonationId,
    ) -> Result<Donation, LifecycleError>;

    /// Advances a donation along `confirmed → in_transit → delivered`.
    ///
    /// # Errors
    /// - `Unauthorized` unless the actor is the assigned volunteer
    /// - `DonationNotFound` for an unknown donation
    /// - `InvalidTransition` for any other requested edge
    fn update_donation_status(
        &self,
        actor: &Identity,
        donation_id: &DonationId,
        new_status: DonationStatus,
    ) -> Result<Donation, LifecycleError>;

    /// Issues one certificate for delivered, uncertified donations.
    ///
    /// # Errors
    /// - `Unauthorized` unless the actor is a donor
    /// - `Ineligible` if any donation cannot be certified; nothing is
    ///   stamped in that case
    fn generate_tax_certificate(
        &self,
        donor: &Identity,
        donation_ids: &[DonationId],
    ) -> Result<TaxCertificate, LifecycleError>;

    /// Claims a reserved lot's items so they can no longer be reserved one
    /// by one. Called by the logistics subsystem, which has already checked
    /// the receiver. All or nothing.
    ///
    /// # Errors
    /// - `FoodItemNotFound` for an unknown item
    /// - `InvalidState` if any item is unavailable, expired or already held
    fn hold_for_lot(
        &self,
        lot_id: &LotId,
        item_ids: &[FoodItemId],
    ) -> Result<(), LifecycleError>;

    /// Marks available items past their expiration date as expired.
    fn expire_food_items(&self) -> Vec<FoodItemId>;

    fn get_food_item(&self, item_id: &FoodItemId) -> Option<FoodItem>;

    fn get_donation(&self, donation_id: &DonationId) -> Option<Donation>;

    /// The reserved lot holding the item, if any.
    fn get_lot_hold(&self, item_id: &FoodItemId) -> Option<LotId>;

    /// The donation created when the item was reserved, if any.
    fn get_donation_for_item(&self, item_id: &FoodItemId) -> Option<Donation>;

    /// Reservable items: available, not held by a lot and not past
    /// expiration.
    fn get_available_food_items(&self) -> Vec<FoodItem>;

    fn get_food_items_by_donor(&self, donor_id: &UserId) -> Vec<FoodItem>;

    /// Items reserved by the receiver, in reservation order.
    fn get_food_items_by_receiver(&self, receiver_id: &UserId) -> Vec<FoodItem>;

    fn get_donations_by_volunteer(&self, volunteer_id: &UserId) -> Vec<Donation>;

    /// Confirmed donations with no volunteer yet.
    fn get_available_deliveries(&self) -> Vec<Donation>;

    /// The donor's delivered donations not yet covered by a certificate.
    fn get_uncertified_donations(&self, donor_id: &UserId) -> Vec<Donation>;

    fn get_tax_certificates_by_donor(&self, donor_id: &UserId) -> Vec<TaxCertificate>;

    /// Counts of records per state.
    fn get_status(&self) -> LifecycleStatus;
}
