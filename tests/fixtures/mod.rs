//! Test fixtures for detour-planner.
//!
//! Provides realistic test data including:
//! - Real Boston / Cambridge locations (from OpenStreetMap)
//! - Blockage builders placed on real streets

pub mod boston_locations;

pub use boston_locations::*;
