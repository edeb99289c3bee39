//! # Donation Lifecycle Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Owns every food item, donation and tax certificate. This is the only
//! subsystem with real state-transition logic; logistics and the views
//! layer consume snapshots of its state.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | A donation is created only from an `available` item, atomically flipping it to `reserved` | `domain/store.rs` - `reserve()` |
//! | First volunteer wins | `domain/store.rs` - `assign_volunteer()` |
//! | `delivered` is reached only via `confirmed → in_transit → delivered` | `domain/entities.rs` - `DonationStatus::can_transition_to()` |
//! | A certificate covers only delivered, uncertified donations of its donor | `domain/store.rs` - `issue_certificate()` |
//! | Only `available` items expire | `domain/store.rs` - `expire_due()` |
//! | An item held by a reserved lot is never reserved on its own | `domain/store.rs` - `hold_for_lot()`, `reserve()` |
//!
//! ## State Machines
//!
//! ```text
//! FoodItem:  [AVAILABLE] ──reserve──→ [RESERVED] ──delivered──→ [DELIVERED]
//!                 │
//!                 └── expiration passed ──→ [EXPIRED]
//!
//! Donation:  [CONFIRMED] ──start──→ [IN_TRANSIT] ──deliver──→ [DELIVERED]
//!                 │                                               │
//!                 └── assign volunteer (once)        certificate (once)
//! ```
//!
//! Every mutating operation runs its checks and writes under a single write
//! guard. Events are published once the guard is released.
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `TimeSource` | Expiration checks and record timestamps |
//! | `IdGenerator` | Opaque identifiers for new records |
//! | `EventPublisher` | Announces committed changes on the shared bus |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::LifecycleConfig;
pub use domain::{
    Donation, DonationStatus, ErrorKind, Ineligibility, LifecycleError, LifecycleStatus,
    LifecycleStore, NewFoodItem, TaxCertificate,
};
pub use ports::{
    IdGenerator, LifecycleApi, ManualTimeSource, SequentialIdGenerator, SystemTimeSource,
    TimeSource, UuidIdGenerator,
};
pub use service::LifecycleService;
