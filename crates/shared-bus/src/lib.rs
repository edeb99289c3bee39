//! # Shared Bus - Event Bus for Inter-Subsystem Communication
//!
//! Subsystems announce committed state changes as `DonationEvent`s; the
//! runtime and the presentation layer subscribe instead of polling.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Lifecycle   │                    │   Runtime    │
//! │              │    publish()       │ (event log)  │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Events are published only after the owning subsystem has released its
//! write guard, so a subscriber never observes an event for a change that
//! was rolled back.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{DonationEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus, NoopPublisher};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
