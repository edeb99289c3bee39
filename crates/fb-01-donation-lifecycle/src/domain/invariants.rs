//! Cross-record consistency checks over a `LifecycleStore`.
//!
//! The store's mutations keep these true by construction; the checks exist
//! so tests (and callers holding a snapshot) can verify them.

use super::entities::{DonationStatus, FoodItemStatus};
use super::store::LifecycleStore;
use std::collections::HashMap;

/// Reserved and delivered items are each referenced by exactly one
/// donation, and the donation's status agrees with the item's.
pub fn invariant_reservation_consistency(store: &LifecycleStore) -> bool {
    let mut references: HashMap<_, usize> = HashMap::new();
    for donation in store.donations.values() {
        *references.entry(&donation.food_item_id).or_default() += 1;

        let Some(item) = store.items.get(&donation.food_item_id) else {
            return false;
        };
        let expected = match donation.status {
            DonationStatus::Pending
            | DonationStatus::Confirmed
            | DonationStatus::InTransit => FoodItemStatus::Reserved,
            DonationStatus::Delivered => FoodItemStatus::Delivered,
        };
        if item.status != expected {
            return false;
        }
    }

    store.items.values().all(|item| {
        let count = references.get(&item.id).copied().unwrap_or(0);
        match item.status {
            FoodItemStatus::Reserved | FoodItemStatus::Delivered => count == 1,
            FoodItemStatus::Available | FoodItemStatus::Expired => count == 0,
        }
    })
}

/// Only confirmed donations lacking a volunteer are open for pickup; every
/// donation past `confirmed` has a volunteer.
pub fn invariant_volunteer_assignment(store: &LifecycleStore) -> bool {
    store.donations.values().all(|donation| match donation.status {
        DonationStatus::InTransit | DonationStatus::Delivered => donation.volunteer_id.is_some(),
        DonationStatus::Pending | DonationStatus::Confirmed => true,
    })
}

/// Every certified donation is delivered, belongs to the certificate's
/// donor, and is listed by exactly the certificate stamped on it.
pub fn invariant_certificate_consistency(store: &LifecycleStore) -> bool {
    let mut covered = HashMap::new();
    for certificate in store.certificates.values() {
        for donation_id in &certificate.donation_ids {
            if covered.insert(donation_id, &certificate.id).is_some() {
                return false;
            }
            let Some(donation) = store.donations.get(donation_id) else {
                return false;
            };
            if donation.status != DonationStatus::Delivered
                || donation.donor_id != certificate.donor_id
                || donation.tax_certificate_id.as_ref() != Some(&certificate.id)
            {
                return false;
            }
        }
    }

    store.donations.values().all(|donation| {
        match &donation.tax_certificate_id {
            Some(certificate_id) => covered.get(&donation.id) == Some(&certificate_id),
            None => !covered.contains_key(&donation.id),
        }
    })
}

/// Items held by a lot are still available and referenced by no donation.
pub fn invariant_lot_holds(store: &LifecycleStore) -> bool {
    store.lot_holds.keys().all(|item_id| {
        store.items.get(item_id).is_some_and(|item| item.is_available())
            && !store.donation_by_item.contains_key(item_id)
    })
}

/// Runs every check, naming the first one that fails.
pub fn check_all(store: &LifecycleStore) -> Result<(), &'static str> {
    if !invariant_reservation_consistency(store) {
        return Err("reservation consistency");
    }
    if !invariant_volunteer_assignment(store) {
        return Err("volunteer assignment");
    }
    if !invariant_certificate_consistency(store) {
        return Err("certificate consistency");
    }
    if !invariant_lot_holds(store) {
        return Err("lot holds");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_is_consistent() {
        assert_eq!(check_all(&LifecycleStore::default()), Ok(()));
    }
}
