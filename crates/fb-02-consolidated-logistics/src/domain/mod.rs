//! Domain layer for the Consolidated Logistics subsystem.

pub mod entities;
pub mod errors;
pub mod registry;
pub mod services;

pub use entities::*;
pub use errors::*;
pub use registry::LogisticsRegistry;
