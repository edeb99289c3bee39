//! Domain services for the Donation Lifecycle subsystem.
//!
//! Input validation and helpers that need no access to the store.

use super::entities::NewFoodItem;
use crate::config::LifecycleConfig;
use shared_types::{Timestamp, ValidationError};

/// Validates and normalizes publication attributes.
///
/// Text fields are trimmed; the returned attributes are what gets stored.
pub fn validate_new_food_item(
    attrs: NewFoodItem,
    config: &LifecycleConfig,
    now: Timestamp,
) -> Result<NewFoodItem, ValidationError> {
    let name = required_text("name", &attrs.name, config.max_name_len)?;
    let unit = required_text("unit", &attrs.unit, config.max_unit_len)?;
    let donor_address = required_text(
        "donor_address",
        &attrs.donor_address,
        config.max_address_len,
    )?;

    if attrs.quantity == 0 {
        return Err(ValidationError::NonPositiveQuantity);
    }

    let earliest_allowed = now.saturating_add(config.min_shelf_life_ms);
    if attrs.expiration_date <= earliest_allowed {
        return Err(ValidationError::ExpirationNotInFuture {
            expiration_date: attrs.expiration_date,
            earliest_allowed,
        });
    }

    Ok(NewFoodItem {
        name,
        quantity: attrs.quantity,
        unit,
        expiration_date: attrs.expiration_date,
        donor_address,
    })
}

fn required_text(field: &'static str, value: &str, max: usize) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(ValidationError::FieldTooLong { field, len, max });
    }
    Ok(trimmed.to_string())
}
