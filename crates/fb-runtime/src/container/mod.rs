//! # Subsystem Container
//!
//! Central container holding both subsystem instances and the event bus
//! they publish to.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, RuntimeConfig};
pub use subsystems::SubsystemContainer;
