//! Lifecycle error types.
//!
//! No error is fatal: every failing operation leaves the store unchanged.

use super::entities::DonationStatus;
use shared_types::{CertificateId, DonationId, FoodItemId, Role, UserId, ValidationError};
use thiserror::Error;

/// Lifecycle error type.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Malformed input attributes.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The record is not in a state that allows the operation.
    #[error("Invalid state for {entity} {id}: {reason}")]
    InvalidState {
        entity: &'static str,
        id: String,
        reason: String,
    },

    /// The requested donation status change is not a permitted edge.
    #[error("Invalid transition for donation {donation_id}: {from} -> {to}")]
    InvalidTransition {
        donation_id: DonationId,
        from: DonationStatus,
        to: DonationStatus,
    },

    /// A tax certificate request references unusable donations.
    #[error("Certificate request rejected: {0}")]
    Ineligible(#[from] Ineligibility),

    #[error("Food item not found: {0}")]
    FoodItemNotFound(FoodItemId),

    #[error("Donation not found: {0}")]
    DonationNotFound(DonationId),

    /// The acting identity may not perform the operation.
    #[error("{actor} ({role}) is not allowed to {operation}")]
    Unauthorized {
        actor: UserId,
        role: Role,
        operation: &'static str,
    },

    /// The id generator produced an identifier already in use.
    #[error("Identifier already in use: {0}")]
    DuplicateId(String),
}

impl LifecycleError {
    /// Coarse classification for presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidState { .. } | Self::InvalidTransition { .. } => ErrorKind::Conflict,
            Self::Ineligible(_) => ErrorKind::Ineligible,
            Self::FoodItemNotFound(_) | Self::DonationNotFound(_) => ErrorKind::NotFound,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::DuplicateId(_) => ErrorKind::Internal,
        }
    }
}

/// Why a tax certificate request was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Ineligibility {
    #[error("no donations selected")]
    Empty,

    #[error("donation {0} listed more than once")]
    Duplicate(DonationId),

    #[error("{size} donations exceed the batch limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    #[error("donation {0} does not exist")]
    UnknownDonation(DonationId),

    #[error("donation {donation_id} belongs to donor {owner}")]
    NotOwner {
        donation_id: DonationId,
        owner: UserId,
    },

    #[error("donation {donation_id} is {status}, not delivered")]
    NotDelivered {
        donation_id: DonationId,
        status: DonationStatus,
    },

    #[error("donation {donation_id} is already covered by certificate {certificate_id}")]
    AlreadyCertified {
        donation_id: DonationId,
        certificate_id: CertificateId,
    },
}

/// Error classes the presentation layer distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Correctable input; re-enter the form.
    Validation,
    /// Lost a race or acted on stale state; refresh.
    Conflict,
    Ineligible,
    NotFound,
    Unauthorized,
    Internal,
}
