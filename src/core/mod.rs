//! Core library modules for butterfly-directions
//!
//! This module contains the internal implementation of the routing machine
//! and its adapters.

pub mod error;
pub mod geo;
pub mod network;
pub mod maneuver;
pub mod options;
pub mod remote;
pub mod route;
pub mod machine;
pub mod coalesce;

// Re-export main types for internal use
pub use machine::RoutingMachine;
pub use options::RoutingOptions;
