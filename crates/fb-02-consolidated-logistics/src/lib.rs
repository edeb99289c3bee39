//! # Consolidated Logistics Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Groups available food items of one zone into consolidated lots that a
//! receiver reserves as a whole, optionally sharing transport with other
//! receivers. Logistics providers and their per-lot quotes are read-only
//! reference data used to price a lot.
//!
//! ## Lot States
//!
//! ```text
//! [AVAILABLE] ──reserve(beneficiary_covers)──→ [RESERVED, 1 participant]
//!      │
//!      └──────reserve(shared_logistics)──────→ [RESERVED, shared] ──join──→ participants + 1
//! ```
//!
//! Items stay owned by the lifecycle subsystem. Reserving a lot asks it to
//! hold the lot's items, which keeps them `available` but takes them out of
//! individual listings and reservations.
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `FoodItemGateway` | Item availability and lot holds |
//! | `EventPublisher` | Announces lot changes on the shared bus |

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod ports;
pub mod service;

pub use config::LogisticsConfig;
pub use domain::{
    ConsolidatedLot, CostShare, LogisticsError, LogisticsOption, LogisticsProvider,
    LogisticsQuote, LogisticsRegistry, LotState,
};
pub use ports::{FoodItemGateway, LogisticsApi};
pub use service::LogisticsService;
