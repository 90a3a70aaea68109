//! floodroute - Flood-aware driving routes scored against flood-prone zones

pub mod api;
pub mod config;
pub mod domain;
pub mod geometry;
pub mod risk;
pub mod server;
pub mod zones;
