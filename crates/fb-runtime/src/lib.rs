//! # FoodBridge Runtime Library
//!
//! This library exposes the runtime's modules for testing. The main entry
//! point is the `main.rs` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - Subsystem container and runtime configuration
//! - `adapters/` - Port implementations connecting the subsystems
//! - `handlers` - Event bus consumers
//! - `views` - Role-based page snapshots for the presentation layer
//! - `seed` - Demo data
//! - `runtime` - Startup, demo scenario and graceful shutdown
//!
//! ## Wiring
//!
//! ```text
//! Lifecycle(1) ──FoodItemPublished / FoodItemReserved / ...──→ Event Bus
//!      ↑                                                          │
//!      │ FoodItemGateway (adapter)                                 ↓
//! Logistics(2) ──LotCreated / LotReserved / ...──→ Event Bus ──→ EventLogHandler
//! ```

#![allow(clippy::too_many_lines)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;
pub mod seed;
pub mod views;

pub use container::{ConfigError, RuntimeConfig, SubsystemContainer};
pub use runtime::{FoodBridgeRuntime, ScenarioReport};
pub use views::{Page, PageView, RouteAction, Views};
