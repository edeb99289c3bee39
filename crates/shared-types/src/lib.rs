//! # Shared Types Crate
//!
//! Identifiers, actor identity, the food item record and shared error types
//! used by every FoodBridge subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-subsystem types are defined here.
//! - **Opaque Identifiers**: every id is a newtype over `String`, so a
//!   `DonationId` can never be passed where a `FoodItemId` is expected.
//! - **Trusted Identity**: `Identity {id, role}` comes from the identity
//!   provider; subsystems authorize on `role` but never authenticate.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
