//! # Error Types
//!
//! Errors shared across subsystems.

use crate::entities::Timestamp;
use thiserror::Error;

/// Malformed input attributes.
///
/// Locally correctable: surfaced to the caller so the form can be re-entered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text field is empty or whitespace.
    #[error("Field '{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// A text field exceeds its configured length.
    #[error("Field '{field}' is {len} characters long, maximum is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// Quantity must be strictly positive.
    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,

    /// Expiration date is not far enough in the future.
    #[error("Expiration {expiration_date} must be after {earliest_allowed}")]
    ExpirationNotInFuture {
        expiration_date: Timestamp,
        earliest_allowed: Timestamp,
    },

    /// A numeric field lies outside its accepted range.
    #[error("Field '{field}' is {value}, expected {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    /// A list argument was empty.
    #[error("'{field}' must contain at least one entry")]
    EmptyList { field: &'static str },

    /// A list argument contained the same entry twice.
    #[error("'{field}' contains duplicate entry {value}")]
    DuplicateEntry { field: &'static str, value: String },
}
