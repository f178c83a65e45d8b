//! Real Boston / Cambridge locations for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap.

use chrono::{DateTime, Utc};
use detour_planner::blockage::{Blockage, NewBlockage};

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }

    /// `[lng, lat]`, the order route requests use on the wire.
    pub fn lng_lat(&self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

// ============================================================================
// Trip endpoints
// ============================================================================

pub const BOSTON_CITY_HALL: Location = Location::new("Boston City Hall", 42.3603, -71.0580);
pub const HARVARD_SQUARE: Location = Location::new("Harvard Square", 42.3736, -71.1190);
pub const LOGAN_AIRPORT: Location = Location::new("Logan Airport Terminal B", 42.3629, -71.0201);
pub const NANTUCKET_FERRY: Location = Location::new("Nantucket Steamship Wharf", 41.2858, -70.0939);

// ============================================================================
// Blockage sites
// ============================================================================

pub const GOVERNMENT_CENTER: Location = Location::new("Government Center", 42.3600, -71.0600);
pub const KENDALL_SQUARE: Location = Location::new("Kendall Square", 42.3625, -71.0862);
pub const CENTRAL_SQUARE: Location = Location::new("Central Square", 42.3654, -71.1037);
pub const CHARLESTOWN: Location = Location::new("Charlestown Navy Yard", 42.4000, -71.0000);

pub fn fixed_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// An active blockage at `location` with the given radius.
pub fn blockage_at(location: &Location, radius: f64) -> Blockage {
    NewBlockage::at(location.lat, location.lng)
        .radius(radius)
        .description(location.name)
        .into_blockage(fixed_now())
        .expect("valid blockage")
}
