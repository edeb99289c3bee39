//! Ports layer for the Donation Lifecycle subsystem.
//!
//! - Inbound: `LifecycleApi` - the operations callers drive
//! - Outbound: `TimeSource`, `IdGenerator` - what the subsystem depends on

pub mod inbound;
pub mod outbound;

pub use inbound::LifecycleApi;
pub use outbound::{
    IdGenerator, ManualTimeSource, SequentialIdGenerator, SystemTimeSource, TimeSource,
    UuidIdGenerator,
};
