//! # Adapter Implementations
//!
//! Concrete implementations of subsystem outbound ports, backed by the other
//! subsystem's inbound API.
//!
//! ```text
//! fb-02 LogisticsService ──FoodItemGateway──→ LifecycleItemGateway
//!                                                    │
//!                                                    ↓
//!                                    fb-01 LifecycleService (LifecycleApi)
//! ```

pub mod food_items;

pub use food_items::LifecycleItemGateway;
