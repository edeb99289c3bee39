//! Ports layer for the Consolidated Logistics subsystem.

pub mod inbound;
pub mod outbound;

pub use inbound::LogisticsApi;
pub use outbound::FoodItemGateway;
