//! Domain layer for the Donation Lifecycle subsystem.
//!
//! Contains pure business logic with no I/O dependencies.

pub mod entities;
pub mod errors;
pub mod invariants;
pub mod services;
pub mod store;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use store::LifecycleStore;
pub use value_objects::*;
